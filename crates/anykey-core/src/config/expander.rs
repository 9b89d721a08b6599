// AnyKey Config - Modifier List Expander
// Expands generic modifier names (Shift -> LShift, RShift, LShift+RShift)

use super::parser::ConfigError;
use crate::{ModifierSlot, Modifiers};

/// Expand a configured modifier list into every exact vector it stands for.
///
/// Specific names (`LShift`, `RAlt`) are added to every variant. A generic
/// name with two sides (`Shift`, `Ctrl`, `Alt`) multiplies the variants by
/// each non-empty left/right choice: left only, right only, both.
///
/// For example `["Shift", "RAlt"]` becomes:
/// - LShift+RAlt
/// - RShift+RAlt
/// - LShift+RShift+RAlt
pub fn expand_modifiers<S: AsRef<str>>(names: &[S]) -> Result<Vec<Modifiers>, ConfigError> {
    let mut variants = vec![Modifiers::NONE];

    for name in names {
        let name = name.as_ref().trim();
        let slots = ModifierSlot::expand_generic(name)
            .ok_or_else(|| ConfigError::InvalidModifier(name.to_string()))?;

        let choices: Vec<Vec<ModifierSlot>> = match slots.as_slice() {
            [left, right] => vec![vec![*left], vec![*right], vec![*left, *right]],
            _ => vec![slots],
        };

        variants = variants
            .iter()
            .flat_map(|base| {
                choices.iter().map(move |choice| {
                    choice.iter().fold(*base, |mods, slot| mods.with(*slot, true))
                })
            })
            .collect();
    }

    // "LShift" alongside "Shift" yields duplicates
    let mut unique = Vec::with_capacity(variants.len());
    for mods in variants {
        if !unique.contains(&mods) {
            unique.push(mods);
        }
    }
    Ok(unique)
}
