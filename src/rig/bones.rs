//! Linear bone chain driving a segmented plate.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// One joint of the chain.
///
/// Joints own two free rotations: `turn` around Y (the page swinging) and
/// `fold` around X (the travelling crease). The offset to the parent is
/// fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    /// Offset from the parent joint, in parent-local space.
    pub local_offset: Vec3,
    pub turn: f32,
    pub fold: f32,
}

impl Joint {
    fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.fold, self.turn, 0.0)
    }
}

/// An ordered chain of joints, each parented to the previous one.
///
/// Joint 0 sits at the plate's bend edge; every later joint is offset one
/// segment-width along +X from its parent. Mutated every frame, destroyed
/// with the page.
#[derive(Debug, Clone)]
pub struct BoneChain {
    joints: Vec<Joint>,
    segment_width: f32,
}

impl BoneChain {
    /// Build a chain of `joint_count` joints spaced `segment_width` apart.
    pub fn new(joint_count: usize, segment_width: f32) -> Self {
        let joints = (0..joint_count)
            .map(|i| Joint {
                local_offset: if i == 0 {
                    Vec3::ZERO
                } else {
                    Vec3::new(segment_width, 0.0, 0.0)
                },
                turn: 0.0,
                fold: 0.0,
            })
            .collect();

        Self {
            joints,
            segment_width,
        }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn segment_width(&self) -> f32 {
        self.segment_width
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Current (turn, fold) angles of a joint.
    pub fn angles(&self, joint: usize) -> (f32, f32) {
        let j = &self.joints[joint];
        (j.turn, j.fold)
    }

    /// Set a joint's rotation directly.
    pub fn set_angles(&mut self, joint: usize, turn: f32, fold: f32) {
        let j = &mut self.joints[joint];
        j.turn = turn;
        j.fold = fold;
    }

    /// Zero every joint rotation.
    pub fn reset(&mut self) {
        for joint in &mut self.joints {
            joint.turn = 0.0;
            joint.fold = 0.0;
        }
    }

    /// Accumulated world transform of every joint, root first.
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let mut transforms = Vec::with_capacity(self.joints.len());
        let mut parent = Mat4::IDENTITY;

        for joint in &self.joints {
            let local =
                Mat4::from_translation(joint.local_offset) * Mat4::from_quat(joint.rotation());
            let world = parent * local;
            transforms.push(world);
            parent = world;
        }

        transforms
    }

}
