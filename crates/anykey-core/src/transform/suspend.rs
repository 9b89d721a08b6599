// AnyKey Suspend / Resume State Machine
// Only the toggle combination is observed while suspended

use crate::output::PressedKeyState;
use crate::{Action, Key};

/// What the caller must do after a toggle key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendTransition {
    None,
    /// Every toggle key was down and the last one is up: reset, grab,
    /// apply the takeover repeat
    Resume,
    /// The toggle keys that suspended us are all up: restore the
    /// original repeat and ungrab
    FinishSuspend,
    /// The combination was completed again before the suspend finished.
    /// The device is still grabbed with the takeover repeat; only reset.
    CancelSuspend,
}

/// Suspend bookkeeping. Starts suspended.
#[derive(Debug, Clone)]
pub struct SuspendContext {
    toggle_keys: Vec<Key>,
    suspended: bool,
    down: PressedKeyState,
    resuming: bool,
    suspending: bool,
}

impl SuspendContext {
    pub fn new(toggle_keys: Vec<Key>) -> Self {
        Self {
            toggle_keys,
            suspended: true,
            down: PressedKeyState::new(),
            resuming: false,
            suspending: false,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Enter suspend from active mode. The toggle keys count as down until
    /// physically released.
    pub fn begin_suspend(&mut self) {
        self.suspended = true;
        self.suspending = true;
        self.resuming = false;
        self.down.set_all(self.toggle_keys.iter().copied());
    }

    /// Feed a key event while suspended
    pub fn on_key(&mut self, key: Key, action: Action) -> SuspendTransition {
        if !self.toggle_keys.contains(&key) {
            return SuspendTransition::None;
        }

        match action {
            Action::Press => {
                self.down.add(key);
                if self.down.len() == self.toggle_keys.len() {
                    self.resuming = true;
                }
                SuspendTransition::None
            }
            Action::Release => {
                self.down.remove(key);
                if !self.down.is_empty() {
                    return SuspendTransition::None;
                }
                if self.resuming {
                    let unfinished = self.suspending;
                    self.resuming = false;
                    self.suspending = false;
                    self.suspended = false;
                    if unfinished {
                        SuspendTransition::CancelSuspend
                    } else {
                        SuspendTransition::Resume
                    }
                } else if self.suspending {
                    self.suspending = false;
                    SuspendTransition::FinishSuspend
                } else {
                    SuspendTransition::None
                }
            }
            Action::Repeat => SuspendTransition::None,
        }
    }
}
