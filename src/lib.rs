//! # Flipbook Rig
//!
//! A Rust library for animating an interactive 3D book: covers, spine and
//! a stack of pages that bend and turn smoothly as the reader flips
//! through them.
//!
//! ## Overview
//!
//! Each page is a flat plate subdivided into bend segments and driven by a
//! linear bone chain. A pure curvature model maps joint indices to turn
//! and fold rotations, a per-page state machine tracks turn transients,
//! and a damped-approach engine eases every continuous property. One
//! sequencer steps the discrete current page toward the requested page;
//! every node reads the same snapshot of it per frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flipbook_rig::{Book, BookConfig};
//!
//! let mut book = Book::new(BookConfig {
//!     page_images: my_svg_faces,
//!     ..BookConfig::default()
//! })?;
//!
//! // Answer rasterization jobs with PNG bytes (async on real hosts)
//! for job in book.take_texture_requests() {
//!     book.complete_rasterization(job.id, rasterize(&job.markup, job.width, job.height));
//! }
//!
//! // Drive from the host's render loop
//! book.set_page(3);
//! book.frame(now_ms, dt_seconds);
//! ```
//!
//! ## Renderer Integration
//!
//! The library renders nothing itself. Hosts pull [`RigBuffers`] per plate
//! (static attributes plus per-frame joint matrices) or CPU-skinned
//! positions from each [`PageNode`], and read eased material parameters
//! from the scene nodes. [`export_skinned_glb`] hands a rigged page to any
//! glTF loader.
//!
//! [`RigBuffers`]: mesh_output::RigBuffers
//! [`PageNode`]: scene::PageNode

pub mod anim;
pub mod controller;
pub mod error;
pub mod export;
pub mod mesh_output;
pub mod rig;
pub mod scene;
pub mod texture;
pub mod types;

// Re-export main types for convenience
pub use anim::{joint_angles, CurlScaling, CurvatureParams, JointAngles, TurnPhase, TurnState};
pub use controller::PageSequencer;
pub use error::{FlipbookError, Result};
pub use export::export_skinned_glb;
pub use mesh_output::{FrameSnapshot, RigBuffers};
pub use rig::{BoneChain, PlateFace, PlateGeometry, Skin};
pub use scene::{Book, CoverNode, PageNode, SpineNode};
pub use texture::{Rasterizer, TextureData, TextureRequest, TextureSlot};
pub use types::{collate_pages, BookConfig, BookPatch, BookStyle, CoverSide, PageRecord};

#[cfg(feature = "wasm")]
pub mod wasm;
