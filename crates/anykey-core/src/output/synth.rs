// AnyKey Output Synthesizer
// Re-expresses text as correctly moded key events

use super::sink::{EventSink, OutputError};
use crate::mapping::{SendTable, Stroke};
use crate::state::KeyboardState;
use crate::{Action, Key, ModifierKeys, Modifiers};

/// Turns text into key events using the reverse character table.
///
/// Borrowed per call from the engine's configuration; all mutable state
/// lives in [`KeyboardState`].
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    send: &'a SendTable,
    modifier_keys: &'a ModifierKeys,
    capslock_key: Key,
}

impl<'a> Synthesizer<'a> {
    pub fn new(send: &'a SendTable, modifier_keys: &'a ModifierKeys, capslock_key: Key) -> Self {
        Self {
            send,
            modifier_keys,
            capslock_key,
        }
    }

    /// Emit only the modifier transitions needed to go from `from` to `to`.
    ///
    /// Slots without a configured key are skipped.
    pub fn send_modifiers<S: EventSink + ?Sized>(
        &self,
        sink: &mut S,
        from: Modifiers,
        to: Modifiers,
    ) -> Result<(), OutputError> {
        for (slot, on) in from.transitions(to) {
            match self.modifier_keys.key_for(slot) {
                Some(key) => {
                    let action = if on { Action::Press } else { Action::Release };
                    sink.key(key, action)?;
                }
                None => log::warn!("no key configured for modifier {}, transition skipped", slot),
            }
        }
        Ok(())
    }

    /// Erase `erase` characters, then type `text`, as one synthesis.
    ///
    /// Held keys are released first and remembered as temporarily released;
    /// caps-lock is tapped off around the output when on; the live modifier
    /// vector is restored afterwards. Characters with no stroke are skipped.
    pub fn send_text<S: EventSink + ?Sized>(
        &self,
        state: &mut KeyboardState,
        sink: &mut S,
        erase: usize,
        text: &str,
    ) -> Result<(), OutputError> {
        if erase == 0 && text.is_empty() {
            return Ok(());
        }
        log::trace!("send_text erase={} text={:?}", erase, text);

        for key in state.held.drain() {
            sink.key(key, Action::Release)?;
            state.released.add(key);
        }

        if state.capslock_on {
            sink.tap(self.capslock_key)?;
        }

        let original = state.mods;
        let erase_stroke = self.send.erase();
        let strokes = std::iter::repeat(Some(erase_stroke))
            .take(erase)
            .chain(text.chars().map(|c| {
                let stroke = self.send.stroke_for(c);
                if stroke.is_none() {
                    log::warn!("no key produces {:?}, character skipped", c);
                }
                stroke
            }))
            .flatten();

        for Stroke { mods, key } in strokes {
            self.send_modifiers(sink, state.mods, mods)?;
            state.mods = mods;
            sink.tap(key)?;
        }

        self.send_modifiers(sink, state.mods, original)?;
        state.mods = original;

        if state.capslock_on {
            sink.tap(self.capslock_key)?;
        }

        Ok(())
    }
}
