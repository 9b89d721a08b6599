// AnyKey Key Type
// Key codes from Linux input-event-codes.h, with name lookup in both directions

use std::fmt;
use std::str::FromStr;

include!(concat!(env!("OUT_DIR"), "/key_codes.rs"));

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Name of this key without the `KEY_` prefix, or `None` for unnamed codes
    pub fn name(self) -> Option<&'static str> {
        KEY_NAMES
            .iter()
            .find(|(_, code)| *code == self.0)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "KEY_{}", name),
            None => write!(f, "KEY_<{}>", self.0),
        }
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

/// Parse a key name to a key code.
///
/// Accepts the evdev spelling (`KEY_LEFTSHIFT`), the bare name (`leftshift`)
/// in any case, and raw decimal codes prefixed with `#` (`#42`).
pub fn key_from_name(name: &str) -> Option<Key> {
    if let Some(raw) = name.strip_prefix('#') {
        return raw.parse::<u16>().ok().map(Key);
    }

    let upper = name.trim().to_ascii_uppercase();
    let bare = upper.strip_prefix("KEY_").unwrap_or(&upper);
    KEY_NAMES
        .iter()
        .find(|(n, _)| *n == bare)
        .map(|(_, code)| Key(*code))
}
