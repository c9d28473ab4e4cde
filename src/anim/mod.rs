//! Animation primitives: easing, paper curvature and turn state.

pub mod curvature;
pub mod easing;
pub mod turning;

pub use curvature::{joint_angles, CurlScaling, CurvatureParams, JointAngles};
pub use turning::{TurnPhase, TurnState};
