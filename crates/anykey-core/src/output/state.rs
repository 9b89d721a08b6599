// AnyKey Pressed Key State
// Insertion-ordered key set; release order follows press order

use indexmap::IndexSet;

use crate::Key;

/// Ordered set of non-modifier keys.
///
/// Used for keys physically held down and for keys released only to emit
/// synthetic output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeyState {
    pressed: IndexSet<Key>,
}

impl PressedKeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key; returns false if it was already present
    pub fn add(&mut self, key: Key) -> bool {
        self.pressed.insert(key)
    }

    /// Remove a key; returns false if it was absent
    pub fn remove(&mut self, key: Key) -> bool {
        self.pressed.shift_remove(&key)
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Keys in press order
    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.pressed.iter().copied()
    }

    /// Remove every key, returning them in press order
    pub fn drain(&mut self) -> Vec<Key> {
        self.pressed.drain(..).collect()
    }

    /// Replace the contents with `keys`
    pub fn set_all(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.pressed = keys.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}
