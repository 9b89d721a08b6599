// AnyKey History Ledger
// Bounded log of written text, able to rebuild what is still visible after undo

use std::collections::VecDeque;

use crate::abbrev::MatchCandidate;

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// One step of output: `clear` trailing characters were erased, then `written` typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Active matches immediately before this step
    pub snapshot: Vec<MatchCandidate>,
    pub clear: usize,
    pub written: String,
}

impl HistoryEntry {
    fn written_len(&self) -> usize {
        self.written.chars().count()
    }
}

/// How [`HistoryLedger::undo_plan`] counts steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoMode {
    /// Every entry that wrote something is a step (dedicated undo key)
    Steps,
    /// Only plain character entries count; expansions are walked over
    /// but not counted (used to take back an abbreviation's trigger)
    Characters,
}

/// Output needed to roll back: `erase` backspaces, then retype `retype`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoPlan {
    pub erase: usize,
    pub retype: String,
}

impl UndoPlan {
    pub fn is_empty(&self) -> bool {
        self.erase == 0 && self.retype.is_empty()
    }
}

/// Bounded FIFO of [`HistoryEntry`]; the oldest entry is evicted on overflow.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryLedger {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn append(&mut self, snapshot: Vec<MatchCandidate>, clear: usize, written: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            snapshot,
            clear,
            written: written.into(),
        });
    }

    /// Remove and return the newest entry
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The last `n` visible characters, oldest first.
    ///
    /// Returns fewer than `n` characters if the ledger runs out.
    pub fn reconstruct(&self, n: usize) -> String {
        reconstruct_from(self.entries.iter().rev(), n)
    }

    /// Plan the output that undoes the last `n` steps.
    ///
    /// Walks newest to oldest tracking the net number of visible characters
    /// removed; the deepest point reached is what must be erased, and
    /// whatever the walk overshot is rebuilt from the older entries and
    /// retyped. Reads only; the caller decides whether to pop entries.
    pub fn undo_plan(&self, n: usize, mode: UndoMode) -> UndoPlan {
        if n == 0 {
            return UndoPlan::default();
        }

        let mut newest_first = self.entries.iter().rev();
        let mut balance: isize = 0;
        let mut deepest: isize = 0;
        let mut steps = 0;

        for entry in newest_first.by_ref() {
            let written = entry.written_len();
            balance -= written as isize;
            deepest = deepest.min(balance);
            balance += entry.clear as isize;

            if written == 0 || (mode == UndoMode::Characters && entry.clear != 0) {
                continue;
            }

            steps += 1;
            if steps == n {
                break;
            }
        }

        let retype = if balance != deepest {
            reconstruct_from(newest_first, (balance - deepest) as usize)
        } else {
            String::new()
        };

        UndoPlan {
            erase: deepest.unsigned_abs(),
            retype,
        }
    }
}

/// Collect the last `n` visible characters from entries given newest first.
///
/// `debt` counts characters already erased by newer entries; it is paid off
/// against the tail of each older entry before anything is collected.
fn reconstruct_from<'a>(
    newest_first: impl Iterator<Item = &'a HistoryEntry>,
    mut n: usize,
) -> String {
    let mut fragments: Vec<&str> = Vec::new();
    let mut debt = 0usize;

    if n == 0 {
        return String::new();
    }

    for entry in newest_first {
        let text = entry.written.as_str();
        let len = entry.written_len();

        if debt < len {
            // Characters [0, visible) of this entry survive the newer erasures
            let visible = len - debt;
            if n <= visible {
                fragments.push(char_slice(text, visible - n, visible));
                n = 0;
                break;
            }
            fragments.push(char_slice(text, 0, visible));
            n -= visible;
            debt = 0;
        } else {
            debt -= len;
        }

        debt += entry.clear;
    }

    log::trace!("reconstructed {} fragment(s), {} char(s) unrecoverable", fragments.len(), n);
    fragments.iter().rev().copied().collect()
}

/// Slice `text` by character positions
fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |pos: usize| {
        text.char_indices()
            .nth(pos)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    &text[byte_at(start)..byte_at(end)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> HistoryLedger {
        let mut ledger = HistoryLedger::default();
        for c in s.chars() {
            ledger.append(vec![], 0, c.to_string());
        }
        ledger
    }

    #[test]
    fn test_reconstruct_plain_typing() {
        let ledger = typed("hello");
        assert_eq!(ledger.reconstruct(5), "hello");
        assert_eq!(ledger.reconstruct(3), "llo");
        assert_eq!(ledger.reconstruct(0), "");
        // Runs out gracefully
        assert_eq!(ledger.reconstruct(9), "hello");
    }

    #[test]
    fn test_reconstruct_skips_erased_characters() {
        // "ae" typed, then replaced by "ä"
        let mut ledger = typed("xae");
        ledger.append(vec![], 2, "ä");
        assert_eq!(ledger.reconstruct(2), "xä");
        assert_eq!(ledger.reconstruct(1), "ä");
    }

    #[test]
    fn test_reconstruct_multi_character_entries() {
        let mut ledger = HistoryLedger::default();
        ledger.append(vec![], 0, "abc");
        ledger.append(vec![], 1, "XY");
        // visible: "abXY"
        assert_eq!(ledger.reconstruct(4), "abXY");
        assert_eq!(ledger.reconstruct(3), "bXY");
    }

    #[test]
    fn test_reconstruct_debt_spanning_entries() {
        let mut ledger = typed("abcd");
        ledger.append(vec![], 3, "Z");
        // visible: "aZ"
        assert_eq!(ledger.reconstruct(2), "aZ");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut ledger = HistoryLedger::new(4);
        for c in "abcdefg".chars() {
            ledger.append(vec![], 0, c.to_string());
        }
        assert_eq!(ledger.len(), 4);
        let kept: String = ledger.entries().map(|e| e.written.as_str()).collect();
        assert_eq!(kept, "defg");
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let ledger = HistoryLedger::new(0);
        assert_eq!(ledger.capacity(), 1);
    }

    #[test]
    fn test_undo_plan_single_character() {
        let ledger = typed("abc");
        assert_eq!(
            ledger.undo_plan(1, UndoMode::Steps),
            UndoPlan { erase: 1, retype: String::new() }
        );
    }

    #[test]
    fn test_undo_repeated_empties_visible_output() {
        let mut ledger = typed("hello");
        let mut erased = 0;
        for _ in 0..5 {
            let plan = ledger.undo_plan(1, UndoMode::Steps);
            assert!(plan.retype.is_empty());
            erased += plan.erase;
            ledger.pop();
        }
        assert_eq!(erased, 5);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_undo_plan_expansion_restores_trigger() {
        let mut ledger = typed("ae");
        ledger.append(vec![], 2, "ä");
        assert_eq!(
            ledger.undo_plan(1, UndoMode::Steps),
            UndoPlan { erase: 1, retype: "ae".to_string() }
        );
    }

    #[test]
    fn test_undo_plan_characters_mode_skips_expansions() {
        // visible "äx"; trigger "aex" spans an earlier expansion
        let mut ledger = typed("ae");
        ledger.append(vec![], 2, "ä");
        ledger.append(vec![], 0, "x");
        assert_eq!(
            ledger.undo_plan(3, UndoMode::Characters),
            UndoPlan { erase: 2, retype: String::new() }
        );
    }

    #[test]
    fn test_undo_plan_overshoot_is_retyped() {
        // "ab" -> "X", then "c"; taking back "bc" walks past the expansion
        let mut ledger = typed("ab");
        ledger.append(vec![], 2, "X");
        ledger.append(vec![], 0, "c");
        assert_eq!(
            ledger.undo_plan(2, UndoMode::Characters),
            UndoPlan { erase: 2, retype: "a".to_string() }
        );
    }

    #[test]
    fn test_undo_plan_underflow_degrades() {
        let ledger = typed("ab");
        assert_eq!(
            ledger.undo_plan(5, UndoMode::Steps),
            UndoPlan { erase: 2, retype: String::new() }
        );
        let empty = HistoryLedger::default();
        assert!(empty.undo_plan(1, UndoMode::Steps).is_empty());
        assert!(ledger.undo_plan(0, UndoMode::Steps).is_empty());
    }

    #[test]
    fn test_undo_plan_does_not_mutate() {
        let ledger = typed("abc");
        let _ = ledger.undo_plan(2, UndoMode::Steps);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_char_slice_multibyte() {
        assert_eq!(char_slice("äöü", 1, 3), "öü");
        assert_eq!(char_slice("äöü", 0, 0), "");
        assert_eq!(char_slice("abc", 2, 9), "c");
    }
}
