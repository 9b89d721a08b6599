// Shared harness for driving the engine without hardware

#![allow(dead_code)]

use std::time::{Duration, Instant};

use anykey_core::testing::{EventRecorder, FakeDevice};
use anykey_core::{Action, Config, Key, Modifiers, RawEvent, Resolved, TransformEngine};

/// Engine plus recorded output, resumed and ready to type
pub struct Session {
    pub engine: TransformEngine,
    pub sink: EventRecorder,
    pub device: FakeDevice,
    pub now: Instant,
    /// Time between consecutive events
    pub step: Duration,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let toggle_keys = config.toggle_keys.clone();
        let mut session = Self {
            engine: TransformEngine::new(config),
            sink: EventRecorder::new(),
            device: FakeDevice::new(),
            now: Instant::now(),
            step: Duration::from_millis(10),
        };
        session.toggle(&toggle_keys);
        assert!(!session.engine.is_suspended());
        session.sink.take();
        session.device.calls.clear();
        session
    }

    pub fn builtin() -> Self {
        Self::new(Config::builtin().unwrap())
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
    }

    pub fn event(&mut self, event: RawEvent) {
        self.now += self.step;
        self.engine
            .process_event(event, self.now, &mut self.sink, &mut self.device)
            .unwrap();
    }

    pub fn press(&mut self, key: Key) {
        self.event(RawEvent::key(key, Action::Press));
    }

    pub fn release(&mut self, key: Key) {
        self.event(RawEvent::key(key, Action::Release));
    }

    pub fn repeat(&mut self, key: Key) {
        self.event(RawEvent::key(key, Action::Repeat));
    }

    pub fn tap(&mut self, key: Key) {
        self.press(key);
        self.release(key);
    }

    pub fn type_keys(&mut self, keys: &[Key]) {
        for key in keys {
            self.tap(*key);
        }
    }

    /// Press every key in order, then release them in reverse
    pub fn toggle(&mut self, keys: &[Key]) {
        for key in keys {
            self.press(*key);
        }
        for key in keys.iter().rev() {
            self.release(*key);
        }
    }

    /// What an application reading the virtual keyboard would show.
    ///
    /// Models the downstream side: held modifier keys, a caps-lock toggle
    /// on the configured caps key, and the erase key deleting one character.
    pub fn screen(&self) -> String {
        let config = self.engine.config();
        let mut capslock = false;
        self.sink.replay_text(config.send.erase().key, |held, key| {
            if key == config.capslock_key {
                capslock = !capslock;
                return None;
            }
            let mods = held
                .iter()
                .filter_map(|k| config.modifier_keys.slot_for(*k))
                .fold(Modifiers::NONE, |m, slot| m.with(slot, true));
            match config.characters.resolve(mods.effective(capslock), key) {
                Some(Resolved::Char(c)) => Some(c),
                _ => None,
            }
        })
    }
}
