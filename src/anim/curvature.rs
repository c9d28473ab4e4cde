//! Procedural paper-curl model.
//!
//! Maps a joint index on the page's bone chain to a pair of rotation
//! angles: one around the turn axis (the page swinging open) and one
//! around the fold axis (the crease that travels across the paper during a
//! turn). The functions here are pure; all per-frame smoothing happens in
//! the caller via the easing engine.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// How the inside-curl oscillation scales with the size of the book.
///
/// Thin books curl more sharply near the binding than thick ones. The
/// scaling law is a plain linear interpolation over the total page count,
/// but which term it feeds differs by book style, so the variants are kept
/// as data rather than separate code paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CurlScaling {
    /// `sin(i * frequency + m)` where `m` interpolates from `start` to
    /// `end` as the page count goes from `min_pages` to `max_pages`.
    PhaseOffset {
        frequency: f32,
        start: f32,
        end: f32,
        min_pages: f32,
        max_pages: f32,
    },
    /// `sin(i * m)` with the interpolated value used as the frequency
    /// itself (spineless softcover look).
    Frequency {
        start: f32,
        end: f32,
        min_pages: f32,
        max_pages: f32,
    },
    /// `sin(i * frequency + phase)`, independent of page count.
    Fixed { frequency: f32, phase: f32 },
}

impl Default for CurlScaling {
    fn default() -> Self {
        CurlScaling::PhaseOffset {
            frequency: 0.1,
            start: 0.45,
            end: 0.31,
            min_pages: 3.0,
            max_pages: 50.0,
        }
    }
}

impl CurlScaling {
    /// Resolve to a `(frequency, phase)` pair for a given page count.
    pub fn resolve(&self, total_pages: usize) -> (f32, f32) {
        match *self {
            CurlScaling::PhaseOffset {
                frequency,
                start,
                end,
                min_pages,
                max_pages,
            } => (frequency, lerp_by_pages(start, end, min_pages, max_pages, total_pages)),
            CurlScaling::Frequency {
                start,
                end,
                min_pages,
                max_pages,
            } => (lerp_by_pages(start, end, min_pages, max_pages, total_pages), 0.0),
            CurlScaling::Fixed { frequency, phase } => (frequency, phase),
        }
    }
}

fn lerp_by_pages(start: f32, end: f32, min_pages: f32, max_pages: f32, total_pages: usize) -> f32 {
    let t = ((total_pages as f32 - min_pages) / (max_pages - min_pages)).clamp(0.0, 1.0);
    start + (end - start) * t
}

/// Tunable constants for the curl shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvatureParams {
    /// Strength of the concave curl near the binding.
    pub inside_strength: f32,
    /// Strength of the convex curl at the free edge.
    pub outside_strength: f32,
    /// Strength of the mid-chain bulge while the page is turning.
    pub turning_strength: f32,
    /// Frequency of the outside-curl cosine.
    pub outside_frequency: f32,
    /// Fold crease amplitude, in degrees.
    pub fold_degrees: f32,
    /// Joints below this index take the inside curl, the rest the outside.
    pub inside_threshold: usize,
    /// Joints past this index take the fold crease.
    pub fold_threshold: usize,
    /// Page-count scaling of the inside curl.
    pub curl_scaling: CurlScaling,
}

impl Default for CurvatureParams {
    fn default() -> Self {
        Self {
            inside_strength: 0.18,
            outside_strength: 0.05,
            turning_strength: 0.09,
            outside_frequency: 0.3,
            fold_degrees: 2.0,
            inside_threshold: 8,
            fold_threshold: 8,
            curl_scaling: CurlScaling::default(),
        }
    }
}

/// Target rotation pair for one joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointAngles {
    /// Rotation around the turn axis (Y).
    pub turn: f32,
    /// Rotation around the fold axis (X).
    pub fold: f32,
}

/// Compute the target angles for one joint of the chain.
///
/// `target_angle` is the page's settled turn rotation, signed by direction.
/// `turning` is the transient progress from [`TurnState`], non-zero only
/// while a turn is in flight. With the book closed every non-root joint
/// flattens to zero and the root carries the whole target, so closed pages
/// stack flat.
///
/// [`TurnState`]: crate::anim::turning::TurnState
pub fn joint_angles(
    joint: usize,
    joint_count: usize,
    total_pages: usize,
    target_angle: f32,
    turning: f32,
    book_closed: bool,
    params: &CurvatureParams,
) -> JointAngles {
    if book_closed {
        return JointAngles {
            turn: if joint == 0 { target_angle } else { 0.0 },
            fold: 0.0,
        };
    }

    let i = joint as f32;
    let (frequency, phase) = params.curl_scaling.resolve(total_pages);

    let inside = if joint < params.inside_threshold {
        (i * frequency + phase).sin()
    } else {
        0.0
    };
    let outside = if joint >= params.inside_threshold {
        (i * params.outside_frequency).cos()
    } else {
        0.0
    };
    let turning_intensity = (i * PI / joint_count as f32).sin() * turning;

    let turn = params.inside_strength * inside * target_angle
        - params.outside_strength * outside * target_angle
        + params.turning_strength * turning_intensity * target_angle;

    let fold_envelope = if joint > params.fold_threshold {
        (i * PI / joint_count as f32 - 0.5).sin() * turning
    } else {
        0.0
    };
    let fold = target_angle.signum() * params.fold_degrees.to_radians() * fold_envelope;

    JointAngles { turn, fold }
}
