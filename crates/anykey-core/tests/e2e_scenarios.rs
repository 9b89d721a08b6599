// AnyKey End-to-End Test Scenarios
//
// These tests simulate real typing sessions against the built-in tables
// (Colemak-style: KEY_A = a, KEY_I = u, KEY_K = e, KEY_S = r, KEY_D = s).
// They drive the full engine without requiring actual hardware.

mod common;

use anykey_core::testing::{DeviceCall, Recorded};
use anykey_core::{Action, AutoRepeat, Config, Key, Modifiers, RawEvent, TransformEngine};
use common::Session;

// =========================================================================
// Abbreviations
// =========================================================================

#[test]
fn test_lower_tier_fires_alone() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::K]);
    assert_eq!(s.screen(), "ä");
}

#[test]
fn test_higher_tier_wins_over_prefix() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::I, Key::K]);
    assert_eq!(s.screen(), "aue");

    let newest = s.engine.history().entries().next_back().unwrap();
    assert_eq!(newest.written, "aue");
    assert_eq!(newest.clear, 3);
}

#[test]
fn test_word_with_protected_sequence() {
    let mut s = Session::builtin();
    // "mauer": m a u e r
    s.type_keys(&[Key::M, Key::A, Key::I, Key::K, Key::S]);
    assert_eq!(s.screen(), "mauer");

    // "müde": m u e d e -> ue collapses
    let mut s = Session::builtin();
    s.type_keys(&[Key::M, Key::I, Key::K, Key::G, Key::K]);
    assert_eq!(s.screen(), "müde");
}

#[test]
fn test_shifted_abbreviation() {
    let mut s = Session::builtin();
    s.press(Key::LEFTSHIFT);
    s.type_keys(&[Key::A, Key::K]);
    s.release(Key::LEFTSHIFT);
    assert_eq!(s.screen(), "Ä");
    assert_eq!(s.engine.keyboard().mods, Modifiers::NONE);
}

#[test]
fn test_lower_tier_completion_keeps_higher_tier_candidate() {
    // "aktuell": the "ue" inside fires first, then "tuell" takes it back
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::N, Key::F, Key::I, Key::K]);
    assert_eq!(s.screen(), "aktü");
    s.type_keys(&[Key::U, Key::U]);
    assert_eq!(s.screen(), "aktuell");
}

// =========================================================================
// Clear
// =========================================================================

#[test]
fn test_clear_splits_trigger() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::HOME, Key::K]);
    assert_eq!(s.screen(), "ae");
    assert_eq!(s.engine.history().len(), 1);
    assert!(s.engine.matcher().active().iter().all(|c| c.matched == 1));
}

#[test]
fn test_clear_key_is_forwarded() {
    let mut s = Session::builtin();
    s.tap(Key::LEFT);
    assert_eq!(
        s.sink.events,
        vec![
            Recorded::Forward(RawEvent::key(Key::LEFT, Action::Press)),
            Recorded::Forward(RawEvent::key(Key::LEFT, Action::Release)),
        ]
    );
}

// =========================================================================
// Undo
// =========================================================================

#[test]
fn test_undo_key_steps_back() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::K]);
    assert_eq!(s.screen(), "ä");

    s.tap(Key::BACKSPACE);
    assert_eq!(s.screen(), "ae");
    s.tap(Key::BACKSPACE);
    assert_eq!(s.screen(), "a");
    s.tap(Key::BACKSPACE);
    assert_eq!(s.screen(), "");
    assert!(s.engine.history().is_empty());
}

#[test]
fn test_undo_restores_matches() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::K, Key::BACKSPACE, Key::BACKSPACE]);
    assert_eq!(s.screen(), "a");

    // The partial "a" match is back, so "e" completes again
    s.type_keys(&[Key::K]);
    assert_eq!(s.screen(), "ä");
}

#[test]
fn test_undo_key_repeat() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::S, Key::D]);
    s.press(Key::BACKSPACE);
    s.repeat(Key::BACKSPACE);
    s.repeat(Key::BACKSPACE);
    s.release(Key::BACKSPACE);
    assert_eq!(s.screen(), "");
}

#[test]
fn test_undo_on_empty_history_erases_once() {
    let mut s = Session::builtin();
    s.tap(Key::BACKSPACE);
    assert_eq!(
        s.sink.keys(),
        vec![(Key::BACKSPACE, Action::Press), (Key::BACKSPACE, Action::Release)]
    );
}

#[test]
fn test_undo_modifier_tap() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::K]);
    s.tap(Key::CAPSLOCK);
    assert_eq!(s.screen(), "ae");

    // Quick taps chain
    s.tap(Key::CAPSLOCK);
    assert_eq!(s.screen(), "a");
}

#[test]
fn test_undo_modifier_slow_tap_is_plain_modifier() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A]);
    s.press(Key::CAPSLOCK);
    s.advance(400);
    s.release(Key::CAPSLOCK);
    assert_eq!(s.screen(), "a");
    assert_eq!(s.engine.history().len(), 1);
}

#[test]
fn test_undo_modifier_used_as_ctrl() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A]);
    s.press(Key::CAPSLOCK);
    s.tap(Key::C);
    s.release(Key::CAPSLOCK);
    assert_eq!(s.screen(), "a");
    assert_eq!(s.engine.history().len(), 1);
}

#[test]
fn test_undo_modifier_hold() {
    let mut s = Session::builtin();
    s.type_keys(&[Key::A, Key::S, Key::D, Key::F]);
    assert_eq!(s.screen(), "arst");

    // Tap, then press again within the window and hold
    s.tap(Key::CAPSLOCK);
    assert_eq!(s.screen(), "ars");
    s.press(Key::CAPSLOCK);
    s.repeat(Key::CAPSLOCK);
    assert_eq!(s.screen(), "ar");
    s.repeat(Key::CAPSLOCK);
    assert_eq!(s.screen(), "a");

    s.advance(1000);
    s.release(Key::CAPSLOCK);
    assert_eq!(s.screen(), "a");

    // Hold mode ended with the release
    s.type_keys(&[Key::D]);
    s.advance(1000);
    s.press(Key::CAPSLOCK);
    s.repeat(Key::CAPSLOCK);
    assert_eq!(s.screen(), "as");
}

// =========================================================================
// Held keys during synthesis
// =========================================================================

#[test]
fn test_held_key_released_during_synthesis() {
    let mut s = Session::builtin();
    s.tap(Key::A);
    s.press(Key::K);
    assert_eq!(s.screen(), "ä");
    assert!(s.engine.keyboard().released.is_pressed(Key::K));

    // Its physical release is swallowed
    s.sink.take();
    s.release(Key::K);
    assert!(s.sink.events.is_empty());
    assert!(s.engine.keyboard().released.is_empty());
}

#[test]
fn test_held_key_reclaimed_on_repeat() {
    let mut s = Session::builtin();
    s.tap(Key::A);
    s.press(Key::K);
    s.repeat(Key::K);
    assert_eq!(s.screen(), "äe");
    assert!(s.engine.keyboard().held.is_pressed(Key::K));

    s.sink.take();
    s.release(Key::K);
    assert_eq!(
        s.sink.events,
        vec![Recorded::Forward(RawEvent::key(Key::K, Action::Release))]
    );
}

// =========================================================================
// Caps-lock
// =========================================================================

#[test]
fn test_capslock_inverts_shift_for_lookup() {
    let mut s = Session::builtin();
    s.tap(Key::ESC);
    assert!(s.engine.keyboard().capslock_on);

    s.type_keys(&[Key::A, Key::K]);
    assert_eq!(s.screen(), "Ä");
    assert!(s.engine.keyboard().capslock_on);

    s.press(Key::LEFTSHIFT);
    s.type_keys(&[Key::A]);
    s.release(Key::LEFTSHIFT);
    assert_eq!(s.screen(), "Äa");
}

// =========================================================================
// Suspend / resume
// =========================================================================

#[test]
fn test_suspend_resume_resets_session() {
    let mut s = Session::builtin();
    s.press(Key::LEFTSHIFT);
    s.tap(Key::ESC);
    s.type_keys(&[Key::A]);
    assert_eq!(s.engine.history().len(), 1);

    s.toggle(&[Key::RIGHTALT, Key::F12]);
    assert!(s.engine.is_suspended());
    assert_eq!(s.device.calls, vec![DeviceCall::Ungrab]);

    // Nothing is seen while suspended
    s.sink.take();
    s.type_keys(&[Key::A, Key::K]);
    assert!(s.sink.events.is_empty());

    s.toggle(&[Key::RIGHTALT, Key::F12]);
    assert!(!s.engine.is_suspended());
    assert_eq!(s.engine.keyboard().mods, Modifiers::NONE);
    assert!(!s.engine.keyboard().capslock_on);
    assert!(s.engine.keyboard().held.is_empty());
    assert!(s.engine.history().is_empty());
    assert!(s.engine.matcher().active().is_empty());

    // The "a" typed before the suspend cannot complete "ae"
    s.type_keys(&[Key::K]);
    assert!(s.engine.history().entries().all(|e| e.clear == 0));
}

#[test]
fn test_toggle_releases_held_keys_and_modifiers() {
    let mut s = Session::builtin();
    s.press(Key::Z);
    s.press(Key::RIGHTALT);
    s.sink.take();
    s.press(Key::F12);

    let keys = s.sink.keys();
    assert_eq!(keys.len(), 4);
    assert_eq!(keys[0], (Key::F12, Action::Press));
    assert!(keys.contains(&(Key::Z, Action::Release)));
    assert!(keys.contains(&(Key::F12, Action::Release)));
    assert_eq!(keys[3], (Key::RIGHTALT, Action::Release));
    assert_eq!(s.engine.keyboard().mods, Modifiers::NONE);
}

#[test]
fn test_repeat_switches_with_suspend() {
    let config = Config::builtin().unwrap();
    let mut engine = TransformEngine::new(config);
    let original = AutoRepeat::new(660, 40);
    let takeover = AutoRepeat::new(250, 33);
    engine.set_repeat(Some(original), Some(takeover));

    let mut sink = anykey_core::testing::EventRecorder::new();
    let mut device = anykey_core::testing::FakeDevice::with_repeat(original);
    let now = std::time::Instant::now();
    let toggle = [
        (Key::RIGHTALT, Action::Press),
        (Key::F12, Action::Press),
        (Key::F12, Action::Release),
        (Key::RIGHTALT, Action::Release),
    ];

    for (key, action) in toggle {
        engine
            .process_event(RawEvent::key(key, action), now, &mut sink, &mut device)
            .unwrap();
    }
    assert!(device.grabbed);
    assert_eq!(device.repeat, Some(takeover));

    for (key, action) in toggle {
        engine
            .process_event(RawEvent::key(key, action), now, &mut sink, &mut device)
            .unwrap();
    }
    assert!(!device.grabbed);
    assert_eq!(device.repeat, Some(original));
}

// =========================================================================
// History capacity
// =========================================================================

#[test]
fn test_history_capacity_bounds_rollback() {
    let toml = r#"
        [general]
        history_capacity = 1

        [modifiers]
        KEY_RIGHTALT = "RAlt"

        [toggle]
        modifiers = ["RAlt"]
        key = "KEY_F12"

        [[characters]]
        [characters.keys]
        KEY_A = "a"
        KEY_E = "e"
        KEY_BACKSPACE = "<undo>"

        [[characters]]
        modifiers = ["RAlt"]
        [characters.keys]
        KEY_A = "ä"

        [[abbreviations]]
        entries = [["ae", "ä"]]
    "#;
    let mut s = Session::new(Config::from_toml(toml).unwrap());
    s.type_keys(&[Key::A, Key::E]);

    // Only "e" was still recorded, so only it is taken back
    assert_eq!(s.screen(), "aä");
    assert_eq!(s.engine.history().len(), 1);
}

#[test]
fn test_non_key_events_forwarded_while_active() {
    let mut s = Session::builtin();
    let msc = RawEvent::new(4, 4, 458_756);
    s.event(msc);
    assert_eq!(s.sink.events, vec![Recorded::Forward(msc)]);
}
