// AnyKey Character Mapping
// (modifier vector, key) -> character or control action, and the reverse send table

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::{Key, Modifiers};

/// What a key resolves to under the current effective modifier vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolved {
    /// An ordinary character, fed to the abbreviation matcher
    Char(char),
    /// Undo the last step (dedicated undo key)
    Undo,
    /// Forget history and partial matches (context change, e.g. cursor movement)
    Clear,
    /// Suspend the pipeline
    Toggle,
}

impl Resolved {
    /// Parse a configured table value: a single character or a `<name>` control
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "<undo>" => return Some(Resolved::Undo),
            "<clear>" => return Some(Resolved::Clear),
            "<toggle>" => return Some(Resolved::Toggle),
            _ => {}
        }
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Resolved::Char(c)),
            _ => None,
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Char(c) => write!(f, "{:?}", c),
            Resolved::Undo => f.write_str("<undo>"),
            Resolved::Clear => f.write_str("<clear>"),
            Resolved::Toggle => f.write_str("<toggle>"),
        }
    }
}

/// Two-level exact lookup: modifier vector -> key -> resolved value.
///
/// Insertion order is kept; it decides which key is used to type a
/// character that several keys produce.
#[derive(Debug, Clone, Default)]
pub struct CharacterTable {
    layers: IndexMap<Modifiers, IndexMap<Key, Resolved>>,
}

impl CharacterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one entry
    pub fn insert(&mut self, mods: Modifiers, key: Key, value: Resolved) {
        self.layers.entry(mods).or_default().insert(key, value);
    }

    /// Resolve a key. `None` means no mapping; the raw event passes through.
    pub fn resolve(&self, mods: Modifiers, key: Key) -> Option<Resolved> {
        self.layers.get(&mods)?.get(&key).copied()
    }

    /// Number of modifier layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total number of entries across all layers
    pub fn len(&self) -> usize {
        self.layers.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Modifiers, Key, Resolved)> + '_ {
        self.layers
            .iter()
            .flat_map(|(mods, keys)| keys.iter().map(move |(key, value)| (*mods, *key, *value)))
    }
}

/// How to type one character: the modifier vector to hold and the key to tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub mods: Modifiers,
    pub key: Key,
}

/// Reverse of [`CharacterTable`], used by the output synthesizer.
#[derive(Debug, Clone)]
pub struct SendTable {
    chars: HashMap<char, Stroke>,
    erase: Stroke,
}

impl SendTable {
    /// Build the reverse table.
    ///
    /// For each character the smallest modifier vector wins; within one
    /// vector the first key listed wins. The erase stroke is the key bound
    /// to [`Resolved::Undo`] under the same rule, else a bare backspace.
    pub fn build(table: &CharacterTable) -> Self {
        let mut chars: HashMap<char, Stroke> = HashMap::new();
        let mut erase: Option<Stroke> = None;

        for (mods, key, value) in table.iter() {
            let current = match value {
                Resolved::Char(c) => chars.get(&c).copied(),
                Resolved::Undo => erase,
                Resolved::Clear | Resolved::Toggle => continue,
            };
            if current.is_some_and(|existing| existing.mods <= mods) {
                continue;
            }
            let stroke = Stroke { mods, key };
            match value {
                Resolved::Char(c) => {
                    chars.insert(c, stroke);
                }
                _ => erase = Some(stroke),
            }
        }

        Self {
            chars,
            erase: erase.unwrap_or(Stroke {
                mods: Modifiers::NONE,
                key: Key::BACKSPACE,
            }),
        }
    }

    pub fn stroke_for(&self, c: char) -> Option<Stroke> {
        self.chars.get(&c).copied()
    }

    /// Stroke that erases one previously typed character
    pub fn erase(&self) -> Stroke {
        self.erase
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModifierSlot;

    fn shift() -> Modifiers {
        Modifiers::from_slots([ModifierSlot::LShift])
    }

    fn ralt() -> Modifiers {
        Modifiers::from_slots([ModifierSlot::RAlt])
    }

    #[test]
    fn test_resolved_parse() {
        assert_eq!(Resolved::parse("a"), Some(Resolved::Char('a')));
        assert_eq!(Resolved::parse("ä"), Some(Resolved::Char('ä')));
        assert_eq!(Resolved::parse("<"), Some(Resolved::Char('<')));
        assert_eq!(Resolved::parse("<undo>"), Some(Resolved::Undo));
        assert_eq!(Resolved::parse("<clear>"), Some(Resolved::Clear));
        assert_eq!(Resolved::parse("ab"), None);
        assert_eq!(Resolved::parse(""), None);
    }

    #[test]
    fn test_resolve_is_exact_match() {
        let mut table = CharacterTable::new();
        table.insert(Modifiers::NONE, Key::A, Resolved::Char('a'));
        table.insert(shift(), Key::A, Resolved::Char('A'));

        assert_eq!(table.resolve(Modifiers::NONE, Key::A), Some(Resolved::Char('a')));
        assert_eq!(table.resolve(shift(), Key::A), Some(Resolved::Char('A')));
        // No fallback from (LShift+RAlt) to LShift
        assert_eq!(table.resolve(shift().with(ModifierSlot::RAlt, true), Key::A), None);
        assert_eq!(table.resolve(Modifiers::NONE, Key::B), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.layer_count(), 2);
    }

    #[test]
    fn test_send_table_prefers_smallest_vector() {
        let mut table = CharacterTable::new();
        table.insert(ralt(), Key::A, Resolved::Char('ä'));
        table.insert(shift(), Key::KEY_1, Resolved::Char('!'));
        table.insert(Modifiers::NONE, Key::Q, Resolved::Char('ä'));

        let send = SendTable::build(&table);
        assert_eq!(
            send.stroke_for('ä'),
            Some(Stroke { mods: Modifiers::NONE, key: Key::Q })
        );
        assert_eq!(send.stroke_for('!'), Some(Stroke { mods: shift(), key: Key::KEY_1 }));
        assert_eq!(send.stroke_for('z'), None);
    }

    #[test]
    fn test_send_table_first_key_wins_within_vector() {
        let mut table = CharacterTable::new();
        table.insert(Modifiers::NONE, Key::KEY_7, Resolved::Char('7'));
        table.insert(Modifiers::NONE, Key::KP7, Resolved::Char('7'));

        let send = SendTable::build(&table);
        assert_eq!(send.stroke_for('7').map(|s| s.key), Some(Key::KEY_7));
    }

    #[test]
    fn test_send_table_erase_stroke() {
        let empty = SendTable::build(&CharacterTable::new());
        assert_eq!(empty.erase().key, Key::BACKSPACE);

        let mut table = CharacterTable::new();
        table.insert(Modifiers::NONE, Key::DELETE, Resolved::Clear);
        table.insert(Modifiers::NONE, Key::BACKSPACE, Resolved::Undo);
        let send = SendTable::build(&table);
        assert_eq!(send.erase(), Stroke { mods: Modifiers::NONE, key: Key::BACKSPACE });
        assert!(send.is_empty());
    }
}
