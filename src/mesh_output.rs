//! Renderer-agnostic frame output.
//!
//! [`RigBuffers`] is the per-plate handoff to the host renderer: static
//! vertex attributes plus the current frame's joint matrices, with
//! zero-copy byte accessors for GPU upload. [`FrameSnapshot`] is a
//! serializable summary of the animation state, used by the CLI and by
//! tests that assert on whole-book behavior.

use crate::anim::TurnPhase;
use crate::rig::{BoneChain, PlateGeometry, Skin};
use crate::scene::Book;
use serde::Serialize;
use std::mem;

/// Flat buffers for one rigged plate.
///
/// The attribute arrays are pose-independent; only `joint_matrices`
/// changes between frames. Hosts that skin on the GPU upload the
/// attributes once and refresh the matrices; CPU hosts can ask the scene
/// node for skinned positions instead.
#[derive(Debug, Clone, Serialize)]
pub struct RigBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Two joint influences per vertex, padded to four.
    pub skin_indices: Vec<[u16; 4]>,
    /// Influence weights matching `skin_indices`.
    pub skin_weights: Vec<[f32; 4]>,
    /// Triangle indices (three per triangle).
    pub indices: Vec<u32>,
    /// Column-major 4x4 skinning matrices, one per joint.
    pub joint_matrices: Vec<[f32; 16]>,
    /// Face index ranges: (material slot, first index, index count).
    pub groups: Vec<(usize, u32, u32)>,
}

impl RigBuffers {
    /// Capture a plate and the current pose of its chain.
    pub fn capture(plate: &PlateGeometry, chain: &BoneChain, skin: &Skin) -> Self {
        Self {
            positions: plate.vertices.iter().map(|v| v.position).collect(),
            normals: plate.vertices.iter().map(|v| v.normal).collect(),
            uvs: plate.vertices.iter().map(|v| v.uv).collect(),
            skin_indices: plate.vertices.iter().map(|v| v.skin_indices).collect(),
            skin_weights: plate.vertices.iter().map(|v| v.skin_weights).collect(),
            indices: plate.indices.clone(),
            joint_matrices: skin
                .joint_matrices(chain)
                .iter()
                .map(|m| m.to_cols_array())
                .collect(),
            groups: plate
                .groups
                .iter()
                .map(|g| (g.face.slot(), g.start, g.count))
                .collect(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw bytes of the positions array. Zero-allocation view.
    pub fn positions_bytes(&self) -> &[u8] {
        cast_slice(&self.positions)
    }

    /// Raw bytes of the skin index array. Zero-allocation view.
    pub fn skin_indices_bytes(&self) -> &[u8] {
        cast_slice(&self.skin_indices)
    }

    /// Raw bytes of the skin weight array. Zero-allocation view.
    pub fn skin_weights_bytes(&self) -> &[u8] {
        cast_slice(&self.skin_weights)
    }

    /// Raw bytes of the joint matrix array. Zero-allocation view.
    pub fn joint_matrices_bytes(&self) -> &[u8] {
        cast_slice(&self.joint_matrices)
    }
}

/// Cast a slice of `T` to a byte slice without allocation.
fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    // SAFETY: [f32; N], [u16; N] and u32 have no padding.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

/// Animation state of one page at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct PageFrame {
    pub index: usize,
    pub visible: bool,
    pub opened: bool,
    pub phase: String,
    pub pivot_turn: f32,
    pub group_z: f32,
    pub mesh_z: f32,
    /// Per-joint (turn, fold) angles.
    pub joint_angles: Vec<(f32, f32)>,
}

/// Serializable summary of the whole book at one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub now_ms: f64,
    pub current_page: usize,
    pub requested_page: usize,
    pub total_pages: usize,
    pub book_closed: bool,
    pub spine_yaw: Option<f32>,
    pub front_cover_angle: f32,
    pub back_cover_angle: f32,
    pub pages: Vec<PageFrame>,
}

impl FrameSnapshot {
    /// Capture the book's animation state at `now_ms`.
    pub fn capture(book: &Book, now_ms: f64) -> Self {
        Self {
            now_ms,
            current_page: book.current_page(),
            requested_page: book.requested_page(),
            total_pages: book.total_pages(),
            book_closed: book.book_closed(),
            spine_yaw: book.spine().map(|s| s.yaw()),
            front_cover_angle: book.front_cover().pivot_angle(),
            back_cover_angle: book.back_cover().pivot_angle(),
            pages: book
                .pages()
                .iter()
                .map(|page| PageFrame {
                    index: page.index,
                    visible: page.visible,
                    opened: page.opened(),
                    phase: phase_name(page.phase(now_ms)).to_string(),
                    pivot_turn: page.pivot_turn(),
                    group_z: page.group_z(),
                    mesh_z: page.mesh_z(),
                    joint_angles: (0..page.chain().len())
                        .map(|joint| page.chain().angles(joint))
                        .collect(),
                })
                .collect(),
        }
    }
}

fn phase_name(phase: TurnPhase) -> &'static str {
    match phase {
        TurnPhase::ClosedFlat => "closed",
        TurnPhase::Turning => "turning",
        TurnPhase::SettledOpen => "open",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{BoneChain, PlateGeometry, Skin};

    #[test]
    fn test_capture_matches_plate() {
        let plate = PlateGeometry::build(1.0, 1.0, 0.01, 30).unwrap();
        let chain = BoneChain::new(31, plate.segment_width());
        let skin = Skin::bind(&plate, &chain).unwrap();

        let buffers = RigBuffers::capture(&plate, &chain, &skin);
        assert_eq!(buffers.vertex_count(), plate.vertex_count());
        assert_eq!(buffers.triangle_count(), plate.triangle_count());
        assert_eq!(buffers.joint_matrices.len(), 31);
        assert_eq!(buffers.groups.len(), 6);
    }

    #[test]
    fn test_byte_views_have_expected_sizes() {
        let plate = PlateGeometry::build(1.0, 1.0, 0.01, 4).unwrap();
        let chain = BoneChain::new(5, plate.segment_width());
        let skin = Skin::bind(&plate, &chain).unwrap();

        let buffers = RigBuffers::capture(&plate, &chain, &skin);
        assert_eq!(buffers.positions_bytes().len(), buffers.vertex_count() * 12);
        assert_eq!(buffers.skin_indices_bytes().len(), buffers.vertex_count() * 8);
        assert_eq!(buffers.skin_weights_bytes().len(), buffers.vertex_count() * 16);
        assert_eq!(buffers.joint_matrices_bytes().len(), 5 * 64);
    }

    #[test]
    fn test_bind_pose_matrices_are_identity() {
        let plate = PlateGeometry::build(1.0, 1.0, 0.01, 4).unwrap();
        let chain = BoneChain::new(5, plate.segment_width());
        let skin = Skin::bind(&plate, &chain).unwrap();

        let buffers = RigBuffers::capture(&plate, &chain, &skin);
        let identity = glam::Mat4::IDENTITY.to_cols_array();
        for matrix in &buffers.joint_matrices {
            for (a, b) in matrix.iter().zip(identity.iter()) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }
}
