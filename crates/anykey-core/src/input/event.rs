// AnyKey Input Layer - Raw Events
// Device-neutral event shape and event type checks

use crate::{Action, Key};

/// EV_SYN event type code
pub const EV_SYN: u16 = 0x00;
/// EV_KEY event type code
pub const EV_KEY: u16 = 0x01;

/// Check if an event type is a key event.
pub fn is_key_event(event_type: u16) -> bool {
    event_type == EV_KEY
}

/// One input event as read from the device: type, code, value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
        }
    }

    /// Key event shorthand
    pub fn key(key: Key, action: Action) -> Self {
        Self::new(EV_KEY, key.code(), action.to_i32())
    }

    /// The key and action, if this is a key event with a known value
    pub fn as_key(&self) -> Option<(Key, Action)> {
        if !is_key_event(self.event_type) {
            return None;
        }
        Action::from_i32(self.value).map(|action| (Key(self.code), action))
    }

    pub fn is_syn(&self) -> bool {
        self.event_type == EV_SYN
    }
}

#[cfg(feature = "uinput")]
impl From<evdev::InputEvent> for RawEvent {
    fn from(event: evdev::InputEvent) -> Self {
        Self::new(event.event_type().0, event.code(), event.value())
    }
}

#[cfg(feature = "uinput")]
impl From<RawEvent> for evdev::InputEvent {
    fn from(event: RawEvent) -> Self {
        evdev::InputEvent::new(evdev::EventType(event.event_type), event.code, event.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_key_event() {
        assert!(is_key_event(EV_KEY));
        assert!(!is_key_event(0x02)); // EV_REL
        assert!(!is_key_event(EV_SYN));
        assert!(!is_key_event(0x04)); // EV_MSC
    }

    #[test]
    fn test_as_key() {
        let press = RawEvent::key(Key::A, Action::Press);
        assert_eq!(press.as_key(), Some((Key::A, Action::Press)));

        let msc = RawEvent::new(0x04, 4, 0x70004);
        assert_eq!(msc.as_key(), None);

        let odd_value = RawEvent::new(EV_KEY, 30, 7);
        assert_eq!(odd_value.as_key(), None);
    }

    #[test]
    fn test_is_syn() {
        assert!(RawEvent::new(EV_SYN, 0, 0).is_syn());
        assert!(!RawEvent::key(Key::A, Action::Release).is_syn());
    }
}
