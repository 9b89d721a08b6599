// AnyKey Abbreviation Matcher
// Priority-tiered abbreviation table and incremental candidate matching

use smallvec::SmallVec;

/// One abbreviation: typing `trigger` replaces it with `expansion`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abbreviation {
    trigger: Vec<char>,
    expansion: String,
}

impl Abbreviation {
    /// Returns `None` for an empty trigger, which could never be typed
    pub fn new(trigger: &str, expansion: &str) -> Option<Self> {
        if trigger.is_empty() {
            return None;
        }
        Some(Self {
            trigger: trigger.chars().collect(),
            expansion: expansion.to_string(),
        })
    }

    pub fn trigger(&self) -> String {
        self.trigger.iter().collect()
    }

    pub fn trigger_len(&self) -> usize {
        self.trigger.len()
    }

    pub fn expansion(&self) -> &str {
        &self.expansion
    }
}

/// Abbreviations grouped in tiers; tier 0 has the highest priority.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationTable {
    tiers: Vec<Vec<Abbreviation>>,
}

impl AbbreviationTable {
    pub fn new(tiers: Vec<Vec<Abbreviation>>) -> Self {
        Self { tiers }
    }

    /// Convenience constructor from `(trigger, expansion)` string pairs.
    /// Entries with an empty trigger are skipped.
    pub fn from_pairs(tiers: &[&[(&str, &str)]]) -> Self {
        Self::new(
            tiers
                .iter()
                .map(|tier| {
                    tier.iter()
                        .filter_map(|(trigger, expansion)| Abbreviation::new(trigger, expansion))
                        .collect()
                })
                .collect(),
        )
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn len(&self) -> usize {
        self.tiers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tiers(&self) -> &[Vec<Abbreviation>] {
        &self.tiers
    }

    pub fn get(&self, id: AbbrevId) -> Option<&Abbreviation> {
        self.tiers.get(id.tier)?.get(id.index)
    }

    fn iter(&self) -> impl Iterator<Item = (AbbrevId, &Abbreviation)> {
        self.tiers.iter().enumerate().flat_map(|(tier, entries)| {
            entries
                .iter()
                .enumerate()
                .map(move |(index, abbr)| (AbbrevId { tier, index }, abbr))
        })
    }
}

/// Position of an abbreviation in its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbbrevId {
    pub tier: usize,
    pub index: usize,
}

/// A partially typed abbreviation.
///
/// `matched` is always strictly less than the trigger length while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    pub id: AbbrevId,
    pub matched: usize,
}

/// A selected completion: erase `trigger_len` characters, then type `expansion`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub id: AbbrevId,
    pub trigger_len: usize,
    pub expansion: String,
}

/// Incremental matcher over an [`AbbreviationTable`]
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    active: Vec<MatchCandidate>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active candidates, in the order they were created
    pub fn active(&self) -> &[MatchCandidate] {
        &self.active
    }

    /// Copy of the active set, stored with each history entry
    pub fn snapshot(&self) -> Vec<MatchCandidate> {
        self.active.clone()
    }

    /// Replace the active set (undo restores the set from before a step)
    pub fn restore(&mut self, snapshot: Vec<MatchCandidate>) {
        self.active = snapshot;
    }

    pub fn reset(&mut self) {
        self.active.clear();
    }

    /// Feed one resolved character.
    ///
    /// Returns the completion with the smallest tier index, if any. Among
    /// completions in the same tier the first one found wins: continuing
    /// candidates (oldest first) before fresh seeds (table order).
    pub fn feed(&mut self, table: &AbbreviationTable, c: char) -> Option<Completion> {
        let mut next = Vec::with_capacity(self.active.len());
        let mut complete: SmallVec<[AbbrevId; 4]> = SmallVec::new();

        for candidate in &self.active {
            let Some(abbr) = table.get(candidate.id) else {
                continue;
            };
            if abbr.trigger.get(candidate.matched) != Some(&c) {
                continue;
            }
            let matched = candidate.matched + 1;
            if matched == abbr.trigger.len() {
                complete.push(candidate.id);
            } else {
                next.push(MatchCandidate { id: candidate.id, matched });
            }
        }

        for (id, abbr) in table.iter() {
            if abbr.trigger[0] != c {
                continue;
            }
            if abbr.trigger.len() == 1 {
                complete.push(id);
            } else {
                next.push(MatchCandidate { id, matched: 1 });
            }
        }

        self.active = next;

        let best = complete
            .iter()
            .copied()
            .reduce(|best, id| if id.tier < best.tier { id } else { best })?;

        // Lower tiers can no longer out-rank the selected completion
        self.active.retain(|candidate| candidate.id.tier <= best.tier);

        let abbr = table.get(best)?;
        Some(Completion {
            id: best,
            trigger_len: abbr.trigger.len(),
            expansion: abbr.expansion.clone(),
        })
    }
}
