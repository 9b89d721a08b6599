// AnyKey Modifier System
// Fixed modifier vector used as an exact-match key into the character table

use std::collections::HashMap;
use std::fmt;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::Key;

/// One named field of the modifier vector.
///
/// Declaration order is significant: it is the order in which vectors are
/// compared, LShift being the most significant field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum ModifierSlot {
    LShift,
    RShift,
    LCtrl,
    RCtrl,
    LMeta,
    LAlt,
    RAlt,
}

impl ModifierSlot {
    const COUNT: u8 = 7;

    fn bit(self) -> u8 {
        1 << (Self::COUNT - 1 - self as u8)
    }

    /// Expand a generic modifier name to its specific slots.
    ///
    /// "Shift" -> [LShift, RShift]; specific names map to themselves.
    pub fn expand_generic(name: &str) -> Option<Vec<ModifierSlot>> {
        match name.to_ascii_lowercase().as_str() {
            "shift" => Some(vec![ModifierSlot::LShift, ModifierSlot::RShift]),
            "ctrl" | "control" => Some(vec![ModifierSlot::LCtrl, ModifierSlot::RCtrl]),
            "alt" => Some(vec![ModifierSlot::LAlt, ModifierSlot::RAlt]),
            "meta" | "super" => Some(vec![ModifierSlot::LMeta]),
            other => other.parse::<ModifierSlot>().ok().map(|slot| vec![slot]),
        }
    }
}

impl fmt::Display for ModifierSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(<&'static str>::from(*self))
    }
}

/// Immutable modifier vector: one flag per [`ModifierSlot`].
///
/// Stored as a bit-set whose numeric order equals the lexicographic order of
/// the flag tuple (LShift, RShift, LCtrl, RCtrl, LMeta, LAlt, RAlt).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No modifier held
    pub const NONE: Modifiers = Modifiers(0);

    pub fn from_slots(slots: impl IntoIterator<Item = ModifierSlot>) -> Self {
        slots.into_iter().fold(Self::NONE, |acc, slot| acc.with(slot, true))
    }

    pub fn get(self, slot: ModifierSlot) -> bool {
        self.0 & slot.bit() != 0
    }

    /// Copy of this vector with one field replaced
    #[must_use]
    pub fn with(self, slot: ModifierSlot, on: bool) -> Self {
        if on {
            Modifiers(self.0 | slot.bit())
        } else {
            Modifiers(self.0 & !slot.bit())
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn shift(self) -> bool {
        self.get(ModifierSlot::LShift) || self.get(ModifierSlot::RShift)
    }

    /// The vector used for character lookup.
    ///
    /// With caps-lock on, both shift fields become the negation of
    /// "any shift held"; everything else is unchanged.
    #[must_use]
    pub fn effective(self, capslock_on: bool) -> Self {
        if !capslock_on {
            return self;
        }
        let shift = !self.shift();
        self.with(ModifierSlot::LShift, shift)
            .with(ModifierSlot::RShift, shift)
    }

    /// Fields that differ between `self` and `target`, with the target value
    pub fn transitions(self, target: Modifiers) -> impl Iterator<Item = (ModifierSlot, bool)> {
        ModifierSlot::iter()
            .filter(move |slot| self.get(*slot) != target.get(*slot))
            .map(move |slot| (slot, target.get(slot)))
    }

    /// Slots set in this vector, in field order
    pub fn slots(self) -> impl Iterator<Item = ModifierSlot> {
        ModifierSlot::iter().filter(move |slot| self.get(*slot))
    }
}

/// Which physical keys drive which modifier slots.
///
/// Several keys may feed one slot; when sending a slot, the first key
/// registered for it is used.
#[derive(Debug, Clone, Default)]
pub struct ModifierKeys {
    by_key: HashMap<Key, ModifierSlot>,
    by_slot: HashMap<ModifierSlot, Key>,
}

impl ModifierKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Key, slot: ModifierSlot) {
        self.by_key.insert(key, slot);
        self.by_slot.entry(slot).or_insert(key);
    }

    /// The slot a key drives, if it is a modifier key
    pub fn slot_for(&self, key: Key) -> Option<ModifierSlot> {
        self.by_key.get(&key).copied()
    }

    /// The key used to emit a slot downstream
    pub fn key_for(&self, slot: ModifierSlot) -> Option<Key> {
        self.by_slot.get(&slot).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NoMod");
        }
        let names: Vec<&'static str> = self.slots().map(<&'static str>::from).collect();
        f.write_str(&names.join("+"))
    }
}
