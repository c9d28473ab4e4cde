//! Linear-blend skinning of a plate by a bone chain.

use super::bones::BoneChain;
use super::plate::PlateGeometry;
use crate::error::{FlipbookError, Result};
use glam::{Mat4, Vec3};

/// A validated binding between a plate and a chain.
///
/// The bind pose is the straight chain, so the inverse bind transform of
/// joint i is a translation by `-i * segment_width` on X.
#[derive(Debug, Clone)]
pub struct Skin {
    inverse_bind: Vec<Mat4>,
}

impl Skin {
    /// Bind a plate to a chain.
    ///
    /// A chain that does not have exactly one joint per segment boundary
    /// is a configuration error, caught here rather than at render time.
    pub fn bind(plate: &PlateGeometry, chain: &BoneChain) -> Result<Self> {
        if chain.len() != plate.segments() + 1 {
            return Err(FlipbookError::RigMismatch {
                segments: plate.segments(),
                joints: chain.len(),
            });
        }

        let segment_width = plate.segment_width();
        let inverse_bind = (0..chain.len())
            .map(|i| Mat4::from_translation(Vec3::new(-(i as f32) * segment_width, 0.0, 0.0)))
            .collect();

        Ok(Self { inverse_bind })
    }

    /// Number of joints in the binding.
    pub fn joint_count(&self) -> usize {
        self.inverse_bind.len()
    }

    /// Inverse bind matrices, joint order.
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind
    }

    /// Per-joint skinning matrices for the chain's current pose.
    pub fn joint_matrices(&self, chain: &BoneChain) -> Vec<Mat4> {
        chain
            .world_transforms()
            .iter()
            .zip(&self.inverse_bind)
            .map(|(world, inv_bind)| *world * *inv_bind)
            .collect()
    }

    /// Deform the plate's vertices by the chain's current pose.
    ///
    /// `v' = sum(w_j * joint_matrix_j * v)` over the vertex's influences.
    pub fn skin_positions(&self, plate: &PlateGeometry, chain: &BoneChain) -> Vec<[f32; 3]> {
        let matrices = self.joint_matrices(chain);

        plate
            .vertices
            .iter()
            .map(|vertex| {
                let p = Vec3::from(vertex.position);
                let mut out = Vec3::ZERO;
                for (&joint, &weight) in vertex.skin_indices.iter().zip(&vertex.skin_weights) {
                    if weight > 0.0 {
                        out += matrices[joint as usize].transform_point3(p) * weight;
                    }
                }
                out.to_array()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn plate_and_chain(segments: usize) -> (PlateGeometry, BoneChain) {
        let plate = PlateGeometry::build(1.0, 0.5, 0.01, segments).unwrap();
        let chain = BoneChain::new(segments + 1, plate.segment_width());
        (plate, chain)
    }

    #[test]
    fn test_bind_rejects_mismatched_chain() {
        let (plate, _) = plate_and_chain(30);
        let short_chain = BoneChain::new(10, plate.segment_width());
        let err = Skin::bind(&plate, &short_chain).unwrap_err();
        assert!(matches!(
            err,
            FlipbookError::RigMismatch {
                segments: 30,
                joints: 10
            }
        ));
    }

    #[test]
    fn test_bind_pose_is_identity() {
        let (plate, chain) = plate_and_chain(8);
        let skin = Skin::bind(&plate, &chain).unwrap();

        let skinned = skin.skin_positions(&plate, &chain);
        for (vertex, out) in plate.vertices.iter().zip(&skinned) {
            for axis in 0..3 {
                assert!((vertex.position[axis] - out[axis]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_root_turn_rotates_whole_plate() {
        let (plate, mut chain) = plate_and_chain(8);
        let skin = Skin::bind(&plate, &chain).unwrap();
        chain.set_angles(0, FRAC_PI_2, 0.0);

        let skinned = skin.skin_positions(&plate, &chain);
        // A vertex at the far edge (x = 1) swings onto -Z
        let far = plate
            .vertices
            .iter()
            .position(|v| (v.position[0] - 1.0).abs() < 1e-5)
            .unwrap();
        assert!(skinned[far][0].abs() < 1e-4);
        assert!(skinned[far][2] < -0.9);
    }

    #[test]
    fn test_mid_chain_bend_leaves_near_edge_fixed() {
        let (plate, mut chain) = plate_and_chain(8);
        let skin = Skin::bind(&plate, &chain).unwrap();
        chain.set_angles(4, 0.5, 0.0);

        let skinned = skin.skin_positions(&plate, &chain);
        for (vertex, out) in plate.vertices.iter().zip(&skinned) {
            if vertex.position[0] < plate.segment_width() * 3.0 {
                // Fully upstream of the bent joint: undeformed
                assert!((vertex.position[0] - out[0]).abs() < 1e-4);
                assert!((vertex.position[2] - out[2]).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_deformation_is_continuous_across_segments() {
        let (plate, mut chain) = plate_and_chain(8);
        let skin = Skin::bind(&plate, &chain).unwrap();
        for i in 0..chain.len() {
            chain.set_angles(i, 0.1, 0.02);
        }

        // Two coincident vertices (shared segment boundary on different
        // faces) must deform identically
        let skinned = skin.skin_positions(&plate, &chain);
        for (i, a) in plate.vertices.iter().enumerate() {
            for (j, b) in plate.vertices.iter().enumerate().skip(i + 1) {
                if a.position == b.position {
                    let pa = Vec3::from(skinned[i]);
                    let pb = Vec3::from(skinned[j]);
                    assert!((pa - pb).length() < 1e-5);
                }
            }
        }
    }
}
