//! Page-index sequencing.
//!
//! The sequencer owns the book's navigation state: the externally
//! requested page and the stepped current page every other component reads.
//! Instead of recursive timers it stores the deadline of its next step and
//! is polled with the frame clock, so tests drive it with a manual clock
//! and disposal cannot leak a pending timer.

/// Step delay while more than [`FAST_GAP`] pages from the target.
pub const FAST_STEP_MS: f64 = 50.0;
/// Step delay while settling near the target.
pub const SLOW_STEP_MS: f64 = 150.0;
/// Gap above which the fast delay applies.
pub const FAST_GAP: usize = 2;

/// Steps the current page toward the requested page, one unit per due
/// tick.
#[derive(Debug, Clone)]
pub struct PageSequencer {
    total_pages: usize,
    requested: usize,
    current: usize,
    next_step_at: Option<f64>,
}

impl PageSequencer {
    /// Create a sequencer for a book of `total_pages`, opened at
    /// `initial` (clamped).
    pub fn new(total_pages: usize, initial: usize) -> Self {
        let initial = initial.min(total_pages);
        Self {
            total_pages,
            requested: initial,
            current: initial,
            next_step_at: None,
        }
    }

    /// The externally requested page.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// The stepped page every component reads this frame.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// The book is closed when resting on either cover.
    pub fn book_closed(&self) -> bool {
        self.current == 0 || self.current == self.total_pages
    }

    /// A page is opened once the current page has moved past it.
    pub fn opened(&self, page_index: usize) -> bool {
        self.current > page_index
    }

    /// No step is pending.
    pub fn is_settled(&self) -> bool {
        self.current == self.requested
    }

    /// Request a page. Out-of-range values clamp silently; a change while
    /// a step is pending redirects immediately, discarding the old delay.
    pub fn request(&mut self, page: usize, now_ms: f64) {
        let page = page.min(self.total_pages);
        if page == self.requested {
            return;
        }
        self.requested = page;
        self.next_step_at = if self.current == self.requested {
            None
        } else {
            Some(now_ms)
        };
    }

    /// Advance at most one step if the deadline has passed, then re-arm.
    ///
    /// The delay to the next step is chosen from the remaining gap: fast
    /// while far from the target, slow while settling. Returns whether a
    /// step happened.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        let due = match self.next_step_at {
            Some(at) if now_ms >= at => true,
            _ => false,
        };
        if !due || self.current == self.requested {
            return false;
        }

        if self.requested > self.current {
            self.current += 1;
        } else {
            self.current -= 1;
        }

        let gap = self.requested.abs_diff(self.current);
        self.next_step_at = if gap == 0 {
            None
        } else if gap > FAST_GAP {
            Some(now_ms + FAST_STEP_MS)
        } else {
            Some(now_ms + SLOW_STEP_MS)
        };

        true
    }

    /// Milliseconds until the next step, if one is pending.
    pub fn next_step_in(&self, now_ms: f64) -> Option<f64> {
        self.next_step_at.map(|at| (at - now_ms).max(0.0))
    }
}
