// AnyKey Undo-by-Modifier Timer
// Quick taps and holds of the undo modifier trigger undo

use std::time::{Duration, Instant};

/// Default window for an undo modifier tap
pub const DEFAULT_UNDO_TIMEOUT: Duration = Duration::from_millis(250);

/// Tracks undo modifier taps.
///
/// A down then up within the timeout is one undo; the timestamp is
/// refreshed on each tap so quick taps chain. A second qualifying down
/// within the window arms hold mode, in which every repeat event of the
/// held key is one more undo. Any non-modifier press ends the window.
#[derive(Debug, Clone)]
pub struct UndoModTimer {
    last: Option<Instant>,
    hold: bool,
    timeout: Duration,
}

impl Default for UndoModTimer {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_TIMEOUT)
    }
}

impl UndoModTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            last: None,
            hold: false,
            timeout,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.hold
    }

    fn within(&self, now: Instant) -> bool {
        self.last
            .is_some_and(|last| now.saturating_duration_since(last) <= self.timeout)
    }

    /// A modifier went down; `qualifies` is whether the resulting vector
    /// is one of the undo vectors.
    pub fn on_modifier_press(&mut self, now: Instant, qualifies: bool) {
        if !qualifies {
            return;
        }
        self.hold = self.within(now);
        self.last = Some(now);
    }

    /// A modifier went up. Returns true if this release is an undo tap.
    pub fn on_modifier_release(&mut self, now: Instant) -> bool {
        self.hold = false;
        if self.within(now) {
            self.last = Some(now);
            true
        } else {
            false
        }
    }

    /// A non-modifier key went down
    pub fn on_key_press(&mut self) {
        self.last = None;
    }

    /// A repeat event arrived. Returns true if it is a held undo.
    pub fn on_repeat(&self) -> bool {
        self.hold
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.hold = false;
    }
}
