// AnyKey uinput Output Layer
// Virtual keyboard creation and event emission

use super::sink::{EventSink, OutputError};
use crate::input::{RawEvent, VIRTUAL_DEVICE_PREFIX};
use crate::{Action, Key};
use smallvec::SmallVec;

use evdev::{EventType, InputEvent};

/// Virtual uinput keyboard receiving the transformed stream.
///
/// Forwarded events are buffered until their EV_SYN arrives so each
/// physical report is written as one frame. Synthesized keys flush the
/// buffer first to keep ordering.
pub struct VirtualKeyboard {
    device: evdev::uinput::VirtualDevice,
    pending: SmallVec<[InputEvent; 8]>,
}

impl VirtualKeyboard {
    /// Create the virtual keyboard
    pub fn new() -> Result<Self, OutputError> {
        use evdev::uinput::VirtualDeviceBuilder;
        use evdev::AttributeSet;

        let mut keys = AttributeSet::new();
        for code in 0..256u16 {
            keys.insert(evdev::Key::new(code));
        }

        let name = format!("{} Keyboard", VIRTUAL_DEVICE_PREFIX);
        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?
            .name(&name)
            .with_keys(&keys)
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?;

        log::info!("created virtual device {:?}", name);

        Ok(Self {
            device,
            pending: SmallVec::new(),
        })
    }

    fn write_pending(&mut self) -> Result<(), OutputError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        // emit() appends the SYN_REPORT itself
        let result = self.device.emit(&self.pending);
        self.pending.clear();
        result.map_err(|e: std::io::Error| OutputError::WriteError(e.to_string()))
    }
}

impl EventSink for VirtualKeyboard {
    fn forward(&mut self, event: RawEvent) -> Result<(), OutputError> {
        if event.is_syn() {
            return self.write_pending();
        }
        self.pending.push(event.into());
        Ok(())
    }

    fn key(&mut self, key: Key, action: Action) -> Result<(), OutputError> {
        self.write_pending()?;
        let event = InputEvent::new(EventType::KEY, key.code(), action.to_i32());
        self.device
            .emit(&[event])
            .map_err(|e: std::io::Error| OutputError::WriteError(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.write_pending()
    }
}
