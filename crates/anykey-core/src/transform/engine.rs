// AnyKey Transform Engine
// Per-event pipeline: modifier tracking, character resolution, abbreviations, undo, suspend
//
// The engine owns the whole session (keyboard state, history, matches,
// suspend context). One call to `process_event` handles one input event
// completely, including any synthesized output, before the next is read.

use std::time::Instant;

use super::suspend::{SuspendContext, SuspendTransition};
use super::undo_timer::UndoModTimer;
use crate::abbrev::Matcher;
use crate::config::Config;
use crate::input::{AutoRepeat, DeviceControl, DeviceError, RawEvent};
use crate::mapping::Resolved;
use crate::output::{EventSink, OutputError, Synthesizer};
use crate::state::{HistoryLedger, KeyboardState, UndoMode};
use crate::{Action, Key, Modifiers};

/// Errors raised while processing an event
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

fn synthesizer(config: &Config) -> Synthesizer<'_> {
    Synthesizer::new(&config.send, &config.modifier_keys, config.capslock_key)
}

/// The event-processing pipeline.
///
/// Starts suspended: events are only watched for the toggle combination
/// until it is pressed and released.
pub struct TransformEngine {
    config: Config,
    keyboard: KeyboardState,
    history: HistoryLedger,
    matcher: Matcher,
    suspend: SuspendContext,
    undo_timer: UndoModTimer,
    /// Device repeat before takeover, restored on suspend and shutdown
    original_repeat: Option<AutoRepeat>,
    /// Repeat applied on resume
    takeover_repeat: Option<AutoRepeat>,
}

impl TransformEngine {
    pub fn new(config: Config) -> Self {
        let history = HistoryLedger::new(config.history_capacity);
        let suspend = SuspendContext::new(config.toggle_keys.clone());
        let undo_timer = UndoModTimer::new(config.undo_timeout);
        let takeover_repeat = config.repeat;

        Self {
            config,
            keyboard: KeyboardState::new(),
            history,
            matcher: Matcher::new(),
            suspend,
            undo_timer,
            original_repeat: None,
            takeover_repeat,
        }
    }

    /// Set the repeat to restore when suspending and the one applied on
    /// resume. `None` leaves the device setting untouched.
    pub fn set_repeat(&mut self, original: Option<AutoRepeat>, takeover: Option<AutoRepeat>) {
        self.original_repeat = original;
        self.takeover_repeat = takeover;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn is_suspended(&self) -> bool {
        self.suspend.is_suspended()
    }

    /// Process one input event that arrived at `now`
    pub fn process_event<S, D>(
        &mut self,
        event: RawEvent,
        now: Instant,
        sink: &mut S,
        device: &mut D,
    ) -> Result<(), EngineError>
    where
        S: EventSink + ?Sized,
        D: DeviceControl + ?Sized,
    {
        if self.suspend.is_suspended() {
            return self.process_suspended(event, device);
        }

        let Some((key, action)) = event.as_key() else {
            sink.forward(event)?;
            return Ok(());
        };

        log::trace!("{} {} mods={}", key, action, self.keyboard.mods);

        match action {
            Action::Release => self.on_release(event, key, now, sink),
            Action::Press => self.on_press(event, key, now, sink),
            Action::Repeat => self.on_repeat(event, key, sink),
        }
    }

    /// Best-effort cleanup on termination.
    ///
    /// Only a suspended engine restores the repeat setting and ungrabs; an
    /// active one leaves the device as it is.
    pub fn shutdown<D: DeviceControl + ?Sized>(&mut self, device: &mut D) {
        if !self.suspend.is_suspended() {
            log::warn!("terminating while active; device grab and repeat are left as they are");
            return;
        }

        if let Some(repeat) = self.original_repeat {
            if let Err(e) = device.set_auto_repeat(repeat) {
                log::warn!("failed to restore auto-repeat: {}", e);
            }
        }
        if let Err(e) = device.ungrab() {
            log::debug!("ungrab on shutdown: {}", e);
        }
    }

    fn process_suspended<D: DeviceControl + ?Sized>(
        &mut self,
        event: RawEvent,
        device: &mut D,
    ) -> Result<(), EngineError> {
        let Some((key, action)) = event.as_key() else {
            return Ok(());
        };

        match self.suspend.on_key(key, action) {
            SuspendTransition::None => {}
            SuspendTransition::Resume => self.resume(device)?,
            SuspendTransition::CancelSuspend => {
                self.reset_session();
                log::info!("suspend cancelled before the toggle keys were released");
            }
            SuspendTransition::FinishSuspend => {
                if let Some(repeat) = self.original_repeat {
                    device.set_auto_repeat(repeat)?;
                }
                device.ungrab()?;
                log::info!("suspended");
            }
        }
        Ok(())
    }

    fn reset_session(&mut self) {
        self.keyboard.reset();
        self.history.clear();
        self.matcher.reset();
        self.undo_timer.reset();
    }

    fn resume<D: DeviceControl + ?Sized>(&mut self, device: &mut D) -> Result<(), EngineError> {
        self.reset_session();

        device.grab()?;
        if let Some(repeat) = self.takeover_repeat {
            device.set_auto_repeat(repeat)?;
        }
        log::info!("resumed");
        Ok(())
    }

    fn on_release<S: EventSink + ?Sized>(
        &mut self,
        event: RawEvent,
        key: Key,
        now: Instant,
        sink: &mut S,
    ) -> Result<(), EngineError> {
        if let Some(slot) = self.config.modifier_keys.slot_for(key) {
            self.keyboard.set_modifier(slot, false);
            let tapped = self.undo_timer.on_modifier_release(now);
            sink.forward(event)?;
            if tapped {
                log::debug!("undo modifier tap");
                self.undo(sink)?;
            }
            return Ok(());
        }

        if self.keyboard.held.remove(key) {
            sink.forward(event)?;
        } else {
            // Already released downstream by a synthesis
            self.keyboard.released.remove(key);
        }
        Ok(())
    }

    fn on_press<S: EventSink + ?Sized>(
        &mut self,
        event: RawEvent,
        key: Key,
        now: Instant,
        sink: &mut S,
    ) -> Result<(), EngineError> {
        if let Some(slot) = self.config.modifier_keys.slot_for(key) {
            self.keyboard.set_modifier(slot, true);
            let qualifies = self.config.undo_modifiers.contains(&self.keyboard.mods);
            self.undo_timer.on_modifier_press(now, qualifies);
            sink.forward(event)?;
            return Ok(());
        }

        self.keyboard.held.add(key);
        self.undo_timer.on_key_press();

        if key == self.config.capslock_key {
            self.keyboard.toggle_capslock();
            sink.forward(event)?;
            return Ok(());
        }

        self.resolve(event, key, sink)
    }

    fn on_repeat<S: EventSink + ?Sized>(
        &mut self,
        event: RawEvent,
        key: Key,
        sink: &mut S,
    ) -> Result<(), EngineError> {
        if self.keyboard.reclaim(key) {
            // Downstream saw a release; restart the key with a press
            let press = RawEvent {
                value: Action::Press.to_i32(),
                ..event
            };
            return self.resolve(press, key, sink);
        }

        if self.undo_timer.on_repeat() {
            log::debug!("undo modifier hold");
            return self.undo(sink);
        }

        self.resolve(event, key, sink)
    }

    fn resolve<S: EventSink + ?Sized>(
        &mut self,
        event: RawEvent,
        key: Key,
        sink: &mut S,
    ) -> Result<(), EngineError> {
        let mods = self.keyboard.effective();

        match self.config.characters.resolve(mods, key) {
            None => sink.forward(event)?,
            Some(Resolved::Toggle) => self.begin_suspend(event, sink)?,
            Some(Resolved::Undo) => {
                // The undo key itself never reaches the output
                self.keyboard.held.remove(key);
                self.undo(sink)?;
            }
            Some(Resolved::Clear) => {
                self.history.clear();
                self.matcher.reset();
                sink.forward(event)?;
            }
            Some(Resolved::Char(c)) => self.type_char(event, c, sink)?,
        }
        Ok(())
    }

    fn type_char<S: EventSink + ?Sized>(
        &mut self,
        event: RawEvent,
        c: char,
        sink: &mut S,
    ) -> Result<(), EngineError> {
        sink.forward(event)?;
        self.history.append(self.matcher.snapshot(), 0, c);

        let Some(completion) = self.matcher.feed(&self.config.abbreviations, c) else {
            return Ok(());
        };

        log::debug!(
            "abbreviation fired: tier {} trigger_len {} -> {:?}",
            completion.id.tier,
            completion.trigger_len,
            completion.expansion
        );

        // Take back the trigger characters, then type the expansion
        let plan = self
            .history
            .undo_plan(completion.trigger_len, UndoMode::Characters);
        let synth = synthesizer(&self.config);
        synth.send_text(&mut self.keyboard, sink, plan.erase, &plan.retype)?;
        let clear = plan.erase.saturating_sub(plan.retype.chars().count());

        synth.send_text(&mut self.keyboard, sink, 0, &completion.expansion)?;
        self.history.append(Vec::new(), clear, completion.expansion);
        Ok(())
    }

    /// Undo one step: roll back the newest entry and restore the matches
    /// that were active before it. With empty history, send one erase.
    fn undo<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), EngineError> {
        let plan = self.history.undo_plan(1, UndoMode::Steps);
        let synth = synthesizer(&self.config);
        synth.send_text(&mut self.keyboard, sink, plan.erase, &plan.retype)?;

        match self.history.pop() {
            Some(entry) => self.matcher.restore(entry.snapshot),
            None => synth.send_text(&mut self.keyboard, sink, 1, "")?,
        }
        Ok(())
    }

    fn begin_suspend<S: EventSink + ?Sized>(
        &mut self,
        event: RawEvent,
        sink: &mut S,
    ) -> Result<(), EngineError> {
        sink.forward(event)?;
        for key in self.keyboard.held.drain() {
            sink.key(key, Action::Release)?;
        }
        synthesizer(&self.config).send_modifiers(sink, self.keyboard.mods, Modifiers::NONE)?;
        self.keyboard.mods = Modifiers::NONE;
        // The frame's EV_SYN is not forwarded once suspended
        sink.flush()?;

        self.suspend.begin_suspend();
        log::info!("suspending; release the toggle keys to hand the keyboard back");
        Ok(())
    }
}
