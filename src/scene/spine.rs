//! The spine plate between the covers.

use std::f32::consts::{FRAC_PI_2, PI};

use super::cover::Pose;
use super::material::MaterialParams;
use super::FrameContext;
use crate::anim::easing::{damp_angle, damp_vec3};
use crate::error::{FlipbookError, Result};
use crate::rig::plate::{build_box, recompute_normals};
use crate::rig::{FaceGroup, Vertex};
use crate::types::BookStyle;
use glam::Vec3;

const WIDTH_SEGMENTS: usize = 20;
const DEPTH_SEGMENTS: usize = 20;

/// Static spine mesh: a thin box whose side vertices bulge outward along
/// a circular arc, giving the rounded spine silhouette.
#[derive(Debug, Clone, PartialEq)]
pub struct SpineGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub groups: Vec<FaceGroup>,
}

impl SpineGeometry {
    /// Build the spine for the given book dimensions.
    pub fn build(spine_width: f32, height: f32, depth: f32) -> Result<Self> {
        if spine_width <= 0.0 || height <= 0.0 || depth <= 0.0 {
            return Err(FlipbookError::InvalidGeometry(format!(
                "spine dimensions must be positive, got {}x{}x{}",
                spine_width, height, depth
            )));
        }

        let (mut vertices, indices, groups) =
            build_box(spine_width, height, depth, WIDTH_SEGMENTS, 1, DEPTH_SEGMENTS);

        let radius = spine_width / PI;
        let face_z = depth / 2.0;

        for vertex in &mut vertices {
            let z = vertex.position[2];
            // Front/back faces stay planar; only the through-depth vertices
            // take the arc inset
            if (z.abs() - face_z).abs() < 1e-6 {
                continue;
            }
            let curve_angle = vertex.position[0] / spine_width * FRAC_PI_2;
            let inset = radius - curve_angle.cos() * radius;
            let sign = if z > 1e-6 {
                1.0
            } else if z < -1e-6 {
                -1.0
            } else {
                0.0
            };
            vertex.position[2] = sign * face_z + inset;
        }

        recompute_normals(&mut vertices, &indices);

        // Recess the spine behind the page stack
        for vertex in &mut vertices {
            vertex.position[2] -= spine_width / 10.0;
        }

        Ok(Self {
            vertices,
            indices,
            groups,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.normal).collect()
    }
}

/// Compute where the spine wants to be for the given navigation state.
///
/// Closed books show the spine edge-on (yaw a quarter turn). On the front
/// opening edge it swings around to face the reader; in the interior it
/// returns edge-on between the splayed covers.
pub fn spine_pose(current_page: usize, total_pages: usize, book_closed: bool) -> Pose {
    let angle = if book_closed {
        FRAC_PI_2
    } else if current_page == 1 {
        -PI
    } else if current_page + 1 == total_pages {
        0.0
    } else {
        FRAC_PI_2
    };

    Pose {
        position: Vec3::ZERO,
        angle,
    }
}

/// Retained state of the spine.
#[derive(Debug, Clone)]
pub struct SpineNode {
    geometry: SpineGeometry,
    pub material: MaterialParams,
    position: Vec3,
    yaw: f32,
}

impl SpineNode {
    pub fn new(spine_width: f32, height: f32, depth: f32) -> Result<Self> {
        Ok(Self {
            geometry: SpineGeometry::build(spine_width, height, depth)?,
            material: MaterialParams::cover_board(),
            position: Vec3::ZERO,
            yaw: 0.0,
        })
    }

    pub fn geometry(&self) -> &SpineGeometry {
        &self.geometry
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Advance the spine by one frame.
    pub fn update(&mut self, ctx: &FrameContext, style: &BookStyle) {
        let pose = spine_pose(ctx.current_page, ctx.total_pages, ctx.book_closed);
        self.position = damp_vec3(self.position, pose.position, style.turn_tau, ctx.dt);
        self.yaw = damp_angle(self.yaw, pose.angle, style.turn_tau, ctx.dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spine_bulges_at_center() {
        let spine = SpineGeometry::build(0.12, 1.75, 0.012).unwrap();
        // The recess shifts everything back; the bulge shows as side
        // vertices sitting proud of the recessed face plane
        let recess = 0.12 / 10.0;
        let face_z = 0.012 / 2.0 - recess;
        let max_z = spine
            .vertices
            .iter()
            .map(|v| v.position[2])
            .fold(f32::MIN, f32::max);
        assert!(max_z > face_z + 1e-4);
    }

    #[test]
    fn test_spine_build_idempotent() {
        let a = SpineGeometry::build(0.12, 1.75, 0.012).unwrap();
        let b = SpineGeometry::build(0.12, 1.75, 0.012).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_spine_rejects_degenerate_dimensions() {
        assert!(SpineGeometry::build(0.0, 1.0, 0.01).is_err());
        assert!(SpineGeometry::build(0.1, 1.0, -0.01).is_err());
    }

    #[test]
    fn test_spine_pose_cases() {
        assert_eq!(spine_pose(0, 10, true).angle, FRAC_PI_2);
        assert_eq!(spine_pose(1, 10, false).angle, -PI);
        assert_eq!(spine_pose(9, 10, false).angle, 0.0);
        assert_eq!(spine_pose(5, 10, false).angle, FRAC_PI_2);
    }

    #[test]
    fn test_node_eases_toward_pose() {
        let mut node = SpineNode::new(0.12, 1.75, 0.012).unwrap();
        let style = BookStyle::soft();
        let ctx = FrameContext {
            now_ms: 0.0,
            dt: 1.0 / 60.0,
            current_page: 0,
            requested_page: 0,
            total_pages: 10,
            book_closed: true,
        };
        for _ in 0..600 {
            node.update(&ctx, &style);
        }
        assert!((node.yaw() - FRAC_PI_2).abs() < 1e-3);
    }
}
