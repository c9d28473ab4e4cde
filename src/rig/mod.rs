//! The page rig: segmented plate geometry, bone chain and skinning.

pub mod bones;
pub mod plate;
pub mod skinning;

pub use bones::{BoneChain, Joint};
pub use plate::{FaceGroup, PlateFace, PlateGeometry, Vertex};
pub use skinning::Skin;
