//! Book style presets.
//!
//! Rigid, soft and spineless books share one rig and one curvature core;
//! the differences between them are this handful of numbers.

use crate::anim::{CurlScaling, CurvatureParams};
use serde::{Deserialize, Serialize};

/// Appearance and motion parameters for one book variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookStyle {
    /// Whether the book has a spine mesh between the covers.
    pub spine: bool,
    /// Curvature constants for the page curl.
    pub curvature: CurvatureParams,
    /// Damping time constant for turn motion, seconds.
    pub turn_tau: f32,
    /// Damping time constant for fold motion, seconds.
    pub fold_tau: f32,
    /// Per-page fan-out of the open stack, degrees per page of distance
    /// from the middle.
    pub interior_tilt_degrees: f32,
    /// Emissive intensity a highlighted page eases toward.
    pub highlight_intensity: f32,
}

impl Default for BookStyle {
    fn default() -> Self {
        Self::soft()
    }
}

impl BookStyle {
    /// Softcover: folding curl with a spine.
    pub fn soft() -> Self {
        Self {
            spine: true,
            curvature: CurvatureParams::default(),
            turn_tau: 0.5,
            fold_tau: 0.3,
            interior_tilt_degrees: 0.6,
            highlight_intensity: 0.22,
        }
    }

    /// Hardcover: stiff plates, no crease, slower easing.
    pub fn rigid() -> Self {
        Self {
            spine: true,
            curvature: CurvatureParams {
                fold_degrees: 0.0,
                ..CurvatureParams::default()
            },
            turn_tau: 0.05,
            fold_tau: 0.05,
            interior_tilt_degrees: 0.0,
            highlight_intensity: 0.22,
        }
    }

    /// Saddle-stitched booklet without a spine mesh.
    pub fn spineless() -> Self {
        Self {
            spine: false,
            curvature: CurvatureParams {
                curl_scaling: CurlScaling::Frequency {
                    start: 0.082,
                    end: 0.06,
                    min_pages: 20.0,
                    max_pages: 50.0,
                },
                ..CurvatureParams::default()
            },
            turn_tau: 0.5,
            fold_tau: 0.3,
            interior_tilt_degrees: 0.6,
            highlight_intensity: 0.22,
        }
    }
}
