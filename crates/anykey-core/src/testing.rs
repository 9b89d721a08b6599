// AnyKey Test Doubles
// In-memory sink and device used to drive the engine without hardware

use crate::input::{AutoRepeat, DeviceControl, DeviceError, RawEvent};
use crate::output::{EventSink, OutputError};
use crate::{Action, Key};

/// One event observed by [`EventRecorder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Forward(RawEvent),
    Key(Key, Action),
}

impl Recorded {
    /// The key event this stands for, forwarded or synthesized
    pub fn as_key(&self) -> Option<(Key, Action)> {
        match self {
            Recorded::Forward(event) => event.as_key(),
            Recorded::Key(key, action) => Some((*key, *action)),
        }
    }
}

/// Sink that records every event in order
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    pub events: Vec<Recorded>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far
    pub fn take(&mut self) -> Vec<Recorded> {
        std::mem::take(&mut self.events)
    }

    /// Key events only, forwarded and synthesized alike
    pub fn keys(&self) -> Vec<(Key, Action)> {
        self.events.iter().filter_map(Recorded::as_key).collect()
    }

    /// Replay the recorded key stream against a reference table and return
    /// the text a downstream application would show. Backspace-like keys
    /// (`erase`) delete the last character; `lookup` maps a key under the
    /// replayed modifier state to a character.
    pub fn replay_text(
        &self,
        erase: Key,
        mut lookup: impl FnMut(&[Key], Key) -> Option<char>,
    ) -> String {
        let mut held: Vec<Key> = Vec::new();
        let mut text = String::new();
        for (key, action) in self.keys() {
            match action {
                Action::Press | Action::Repeat => {
                    if key == erase {
                        text.pop();
                    } else if let Some(c) = lookup(&held, key) {
                        text.push(c);
                    }
                    if action == Action::Press && !held.contains(&key) {
                        held.push(key);
                    }
                }
                Action::Release => held.retain(|k| *k != key),
            }
        }
        text
    }
}

impl EventSink for EventRecorder {
    fn forward(&mut self, event: RawEvent) -> Result<(), OutputError> {
        self.events.push(Recorded::Forward(event));
        Ok(())
    }

    fn key(&mut self, key: Key, action: Action) -> Result<(), OutputError> {
        self.events.push(Recorded::Key(key, action));
        Ok(())
    }
}

/// Device-control call observed by [`FakeDevice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    Grab,
    Ungrab,
    SetRepeat(AutoRepeat),
}

/// Device stand-in that records grab / repeat calls
#[derive(Debug, Clone, Default)]
pub struct FakeDevice {
    pub calls: Vec<DeviceCall>,
    pub grabbed: bool,
    pub repeat: Option<AutoRepeat>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repeat(repeat: AutoRepeat) -> Self {
        Self {
            repeat: Some(repeat),
            ..Self::default()
        }
    }
}

impl DeviceControl for FakeDevice {
    fn grab(&mut self) -> Result<(), DeviceError> {
        self.grabbed = true;
        self.calls.push(DeviceCall::Grab);
        Ok(())
    }

    fn ungrab(&mut self) -> Result<(), DeviceError> {
        self.grabbed = false;
        self.calls.push(DeviceCall::Ungrab);
        Ok(())
    }

    fn auto_repeat(&self) -> Option<AutoRepeat> {
        self.repeat
    }

    fn set_auto_repeat(&mut self, repeat: AutoRepeat) -> Result<(), DeviceError> {
        self.repeat = Some(repeat);
        self.calls.push(DeviceCall::SetRepeat(repeat));
        Ok(())
    }
}
