//! Per-page turn state.
//!
//! A page has no explicit state machine; its phase is re-derived every
//! frame from the opened flag and the timestamp of the last flip. The
//! transient progress is a sine lobe that peaks mid-turn and returns to
//! zero at both ends, modelling the paper lifting and settling.

use std::f32::consts::PI;

/// Derived phase of a page's turn animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Settled on the unopened side.
    ClosedFlat,
    /// Mid-flight between sides.
    Turning,
    /// Settled on the opened side.
    SettledOpen,
}

/// Tracks when a page last flipped between opened and unopened.
#[derive(Debug, Clone)]
pub struct TurnState {
    last_opened: bool,
    turned_at_ms: f64,
    turn_duration_ms: f64,
}

impl TurnState {
    /// Default turn duration in milliseconds.
    pub const DEFAULT_DURATION_MS: f64 = 400.0;

    /// Create a state that starts settled (no transient in flight).
    pub fn new(opened: bool, turn_duration_ms: f64) -> Self {
        Self {
            last_opened: opened,
            turned_at_ms: f64::NEG_INFINITY,
            turn_duration_ms,
        }
    }

    /// Record the current opened flag and return the turning progress.
    ///
    /// The transition timestamp refreshes exactly when the flag flips.
    /// Progress is `sin(-PI * t)` with `t = clamp(elapsed / duration, 0, 1)`:
    /// zero at rest, peaking at the turn midpoint, back to zero once the
    /// duration has elapsed.
    pub fn update(&mut self, opened: bool, now_ms: f64) -> f32 {
        if opened != self.last_opened {
            self.turned_at_ms = now_ms;
            self.last_opened = opened;
        }
        self.progress(now_ms)
    }

    /// Turning progress at `now_ms`, in [-1, 0].
    pub fn progress(&self, now_ms: f64) -> f32 {
        let t = ((now_ms - self.turned_at_ms) / self.turn_duration_ms).clamp(0.0, 1.0) as f32;
        if t <= 0.0 || t >= 1.0 {
            return 0.0;
        }
        (-PI * t).sin()
    }

    /// Phase derived from the opened flag and elapsed time.
    pub fn phase(&self, now_ms: f64) -> TurnPhase {
        if now_ms - self.turned_at_ms < self.turn_duration_ms {
            TurnPhase::Turning
        } else if self.last_opened {
            TurnPhase::SettledOpen
        } else {
            TurnPhase::ClosedFlat
        }
    }

    /// The opened flag seen on the last update.
    pub fn opened(&self) -> bool {
        self.last_opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_settled() {
        let state = TurnState::new(false, 400.0);
        assert_eq!(state.phase(0.0), TurnPhase::ClosedFlat);
        assert_eq!(state.progress(0.0), 0.0);
    }

    #[test]
    fn test_flip_records_timestamp_and_peaks_midway() {
        let mut state = TurnState::new(false, 400.0);
        assert_eq!(state.update(false, 1000.0), 0.0);

        // Edge: opened flips at t=1000
        let at_flip = state.update(true, 1000.0);
        assert!(at_flip.abs() < 1e-6);
        assert_eq!(state.phase(1000.0), TurnPhase::Turning);

        // Peak magnitude at the midpoint
        let mid = state.update(true, 1200.0);
        assert!((mid + 1.0).abs() < 1e-6);

        // Back to ~zero at the end, settled open
        let done = state.update(true, 1400.0);
        assert!(done.abs() < 1e-5);
        assert_eq!(state.phase(1400.0), TurnPhase::SettledOpen);
    }

    #[test]
    fn test_reopen_restarts_transient() {
        let mut state = TurnState::new(false, 400.0);
        state.update(true, 0.0);
        state.update(true, 400.0);
        assert_eq!(state.phase(400.0), TurnPhase::SettledOpen);

        state.update(false, 500.0);
        assert_eq!(state.phase(500.0), TurnPhase::Turning);
        let mid = state.progress(700.0);
        assert!((mid + 1.0).abs() < 1e-6);
        assert_eq!(state.phase(900.0), TurnPhase::ClosedFlat);
    }

    #[test]
    fn test_steady_flag_never_restarts() {
        let mut state = TurnState::new(true, 400.0);
        for frame in 0..100 {
            let p = state.update(true, frame as f64 * 16.0);
            assert_eq!(p, 0.0);
        }
        assert_eq!(state.phase(1600.0), TurnPhase::SettledOpen);
    }
}
