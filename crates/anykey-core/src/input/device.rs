// AnyKey Input Layer - Device Control
// Exclusive grab and auto-repeat control over the physical keyboard

use super::repeat::AutoRepeat;

/// Errors from the physical input device
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to open input device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to read from our own virtual device: {0}")]
    VirtualDevice(String),

    #[error("Failed to grab input device: {0}")]
    Grab(std::io::Error),

    #[error("Failed to release input device: {0}")]
    Ungrab(std::io::Error),

    #[error("Failed to set auto-repeat: {0}")]
    Repeat(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Control operations the pipeline needs from the input device
pub trait DeviceControl {
    /// Take exclusive ownership; no other reader sees events afterwards
    fn grab(&mut self) -> Result<(), DeviceError>;

    /// Give exclusive ownership back
    fn ungrab(&mut self) -> Result<(), DeviceError>;

    /// Current auto-repeat setting, if the device reports one
    fn auto_repeat(&self) -> Option<AutoRepeat>;

    fn set_auto_repeat(&mut self, repeat: AutoRepeat) -> Result<(), DeviceError>;
}

/// Name prefix of the virtual output device; never used as input
pub const VIRTUAL_DEVICE_PREFIX: &str = "AnyKey (virtual)";

/// Check if a device name belongs to our own virtual output device
pub fn is_virtual_device(device_name: &str) -> bool {
    device_name.starts_with(VIRTUAL_DEVICE_PREFIX)
}

// Representative letter and space codes: Q, W, E, R, T, Y, A, Z, SPACE
const KEYBOARD_CODES: &[u16] = &[16, 17, 18, 19, 20, 21, 30, 44, 57];

/// Determine if a set of supported key codes looks like a typing keyboard
pub fn is_keyboard(supported: impl Fn(u16) -> bool) -> bool {
    KEYBOARD_CODES.iter().all(|code| supported(*code))
}

/// Device information for listing devices
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: std::path::PathBuf,
    pub name: String,
}

/// A physical evdev keyboard opened by path
#[cfg(feature = "uinput")]
pub struct InputDevice {
    device: evdev::Device,
    path: String,
}

#[cfg(feature = "uinput")]
impl InputDevice {
    /// Open the device at `path`. The device is not grabbed.
    pub fn open(path: &str) -> Result<Self, DeviceError> {
        let device = evdev::Device::open(path).map_err(|source| DeviceError::Open {
            path: path.to_string(),
            source,
        })?;

        let name = device.name().unwrap_or("Unknown").to_string();
        if is_virtual_device(&name) {
            return Err(DeviceError::VirtualDevice(name));
        }

        let looks_like_keyboard = device
            .supported_keys()
            .map(|keys| is_keyboard(|code| keys.contains(evdev::Key::new(code))))
            .unwrap_or(false);
        if !looks_like_keyboard {
            log::warn!("{} ({}) does not look like a keyboard", name, path);
        }

        Ok(Self {
            device,
            path: path.to_string(),
        })
    }

    /// Keyboards that could be opened as input, excluding our own output
    pub fn list_keyboards() -> Vec<DeviceInfo> {
        evdev::enumerate()
            .filter_map(|(path, device)| {
                let name = device.name().unwrap_or("Unknown").to_string();
                if is_virtual_device(&name) {
                    return None;
                }
                let keys = device.supported_keys()?;
                if !is_keyboard(|code| keys.contains(evdev::Key::new(code))) {
                    return None;
                }
                Some(DeviceInfo { path, name })
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        self.device.name().unwrap_or("Unknown")
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait up to `timeout_ms` for input, then read what is pending.
    ///
    /// Returns an empty vector on timeout or EINTR so the caller can check
    /// its shutdown flag. Errors only on fatal I/O failures.
    pub fn poll_events(&mut self, timeout_ms: i32) -> Result<Vec<super::RawEvent>, DeviceError> {
        use std::os::unix::io::AsRawFd;

        let mut poll_fd = libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        let poll_result = unsafe { libc::poll(&mut poll_fd, 1, timeout_ms) };

        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(DeviceError::Io(err));
        }

        if poll_result == 0 || poll_fd.revents & libc::POLLIN == 0 {
            if poll_fd.revents & (libc::POLLHUP | libc::POLLERR) != 0 {
                return Err(DeviceError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "input device went away",
                )));
            }
            return Ok(Vec::new());
        }

        Ok(self
            .device
            .fetch_events()?
            .map(super::RawEvent::from)
            .collect())
    }
}

#[cfg(feature = "uinput")]
impl DeviceControl for InputDevice {
    fn grab(&mut self) -> Result<(), DeviceError> {
        self.device.grab().map_err(DeviceError::Grab)
    }

    fn ungrab(&mut self) -> Result<(), DeviceError> {
        self.device.ungrab().map_err(DeviceError::Ungrab)
    }

    fn auto_repeat(&self) -> Option<AutoRepeat> {
        self.device.get_auto_repeat().map(AutoRepeat::from)
    }

    fn set_auto_repeat(&mut self, repeat: AutoRepeat) -> Result<(), DeviceError> {
        self.device
            .update_auto_repeat(&repeat.into())
            .map_err(DeviceError::Repeat)
    }
}
