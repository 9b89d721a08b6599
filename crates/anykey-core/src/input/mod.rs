// AnyKey Input Layer
// Raw events, physical device control, and auto-repeat settings

mod device;
mod event;
mod repeat;

pub use device::{
    is_keyboard, is_virtual_device, DeviceControl, DeviceError, DeviceInfo, VIRTUAL_DEVICE_PREFIX,
};
pub use event::{is_key_event, RawEvent, EV_KEY, EV_SYN};
pub use repeat::{parse_xset_query, query_xset, AutoRepeat};

#[cfg(feature = "uinput")]
pub use device::InputDevice;
