// AnyKey Keyboard State
// Live modifier vector, caps-lock flag, and held / temporarily released keys

use crate::output::PressedKeyState;
use crate::{Key, ModifierSlot, Modifiers};

/// Everything the pipeline knows about the physical keyboard.
///
/// `mods` is the literal vector as sent downstream; character lookup uses
/// [`KeyboardState::effective`], which folds in caps-lock.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pub mods: Modifiers,
    pub capslock_on: bool,
    /// Non-modifier keys currently held down
    pub held: PressedKeyState,
    /// Held keys released downstream to emit synthetic output; they become
    /// held again on their next repeat event
    pub released: PressedKeyState,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_modifier(&mut self, slot: ModifierSlot, on: bool) {
        self.mods = self.mods.with(slot, on);
    }

    pub fn toggle_capslock(&mut self) {
        self.capslock_on = !self.capslock_on;
    }

    /// Vector used for character resolution
    pub fn effective(&self) -> Modifiers {
        self.mods.effective(self.capslock_on)
    }

    /// A repeat event for a temporarily released key makes it held again.
    /// Returns true if that happened.
    pub fn reclaim(&mut self, key: Key) -> bool {
        if self.released.remove(key) {
            self.held.add(key);
            true
        } else {
            false
        }
    }

    /// Back to the initial state: no modifiers, caps-lock off, nothing held
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
