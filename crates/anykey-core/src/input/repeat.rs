// AnyKey Auto-Repeat Settings
// Keyboard repeat (delay, period) and the xset query that supplies it

use std::sync::OnceLock;

use regex::Regex;

/// Keyboard auto-repeat: initial delay and interval between repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRepeat {
    pub delay_ms: u32,
    pub period_ms: u32,
}

impl AutoRepeat {
    pub fn new(delay_ms: u32, period_ms: u32) -> Self {
        Self { delay_ms, period_ms }
    }

    /// From X11 terms: delay in ms and rate in repeats per second
    pub fn from_rate(delay_ms: u32, rate_hz: u32) -> Self {
        Self {
            delay_ms,
            period_ms: (1000 / rate_hz.max(1)).max(1),
        }
    }
}

#[cfg(feature = "uinput")]
impl From<evdev::AutoRepeat> for AutoRepeat {
    fn from(repeat: evdev::AutoRepeat) -> Self {
        Self::new(repeat.delay, repeat.period)
    }
}

#[cfg(feature = "uinput")]
impl From<AutoRepeat> for evdev::AutoRepeat {
    fn from(repeat: AutoRepeat) -> Self {
        evdev::AutoRepeat {
            delay: repeat.delay_ms,
            period: repeat.period_ms,
        }
    }
}

fn xset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^\s*auto repeat delay:\s*(?P<delay>\d+)\s*repeat rate:\s*(?P<rate>\d+)")
            .expect("static regex is valid")
    })
}

/// Extract the repeat settings from `xset -q` output
pub fn parse_xset_query(output: &str) -> Option<AutoRepeat> {
    let caps = xset_pattern().captures(output)?;
    let delay = caps.name("delay")?.as_str().parse().ok()?;
    let rate = caps.name("rate")?.as_str().parse().ok()?;
    Some(AutoRepeat::from_rate(delay, rate))
}

/// Ask the X server for its repeat settings.
///
/// Returns `None` (after logging) when xset is missing or says nothing
/// usable; the caller then leaves the device repeat untouched.
pub fn query_xset() -> Option<AutoRepeat> {
    let output = match std::process::Command::new("xset").arg("-q").output() {
        Ok(output) => output,
        Err(e) => {
            log::warn!("could not run xset -q: {}", e);
            return None;
        }
    };
    let text = String::from_utf8_lossy(&output.stdout);
    let repeat = parse_xset_query(&text);
    if repeat.is_none() {
        log::warn!("xset -q output has no auto repeat line");
    }
    repeat
}
