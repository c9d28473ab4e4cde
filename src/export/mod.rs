//! Mesh export formats.

pub mod gltf;

pub use gltf::export_skinned_glb;
