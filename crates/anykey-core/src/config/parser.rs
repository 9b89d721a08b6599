// AnyKey Config Parser - TOML with Serde
// Parses character tables, abbreviations, and control keys from TOML

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

use super::expander::expand_modifiers;
use crate::abbrev::{Abbreviation, AbbreviationTable};
use crate::input::AutoRepeat;
use crate::mapping::{CharacterTable, Resolved, SendTable};
use crate::state::DEFAULT_HISTORY_CAPACITY;
use crate::transform::DEFAULT_UNDO_TIMEOUT;
use crate::{Key, ModifierKeys, ModifierSlot, Modifiers};

const BUILTIN_CONFIG: &str = include_str!("builtin.toml");

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Invalid character value for {key}: {value:?} (expected one character, \"<undo>\" or \"<clear>\")")]
    InvalidCharacter { key: String, value: String },

    #[error("Empty abbreviation trigger in tier {0}")]
    EmptyTrigger(usize),

    #[error("history_capacity must be at least 1")]
    ZeroHistoryCapacity,

    #[error("No key is mapped to modifier {0}")]
    UnmappedModifier(String),

    #[error("{0} is not a modifier key")]
    NotAModifierKey(String),
}

/// Root TOML table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub general: GeneralConfig,

    /// Key name -> modifier slot name
    #[serde(default)]
    pub modifiers: IndexMap<String, String>,

    pub toggle: ToggleConfig,

    #[serde(default)]
    pub undo: UndoConfig,

    #[serde(default)]
    pub repeat: Option<RepeatConfig>,

    #[serde(default)]
    pub characters: Vec<CharacterLayerToml>,

    /// One entry per tier, highest priority first
    #[serde(default)]
    pub abbreviations: Vec<AbbreviationTierToml>,
}

/// General settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Input device path
    pub device: Option<String>,
    pub history_capacity: Option<usize>,
    pub capslock_key: Option<String>,
}

/// Suspend toggle: hold `modifiers`, press `key`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleConfig {
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UndoConfig {
    /// Modifier keys whose quick tap is an undo
    #[serde(default)]
    pub modifier_keys: Vec<String>,
    pub timeout_ms: Option<u64>,
}

/// Takeover auto-repeat; overrides the xset query
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepeatConfig {
    pub delay_ms: u32,
    pub rate_hz: u32,
}

/// One layer of the character table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterLayerToml {
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Key name -> character, "<undo>" or "<clear>"; order matters for the
    /// reverse table
    #[serde(default)]
    pub keys: IndexMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbbreviationTierToml {
    /// (trigger, expansion) pairs
    #[serde(default)]
    pub entries: Vec<(String, String)>,
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Input device path, if configured
    pub device: Option<String>,
    pub characters: CharacterTable,
    /// Reverse of `characters`
    pub send: SendTable,
    pub abbreviations: AbbreviationTable,
    pub modifier_keys: ModifierKeys,
    pub capslock_key: Key,
    pub toggle_modifiers: Modifiers,
    pub toggle_key: Key,
    /// Physical keys of the toggle combination, modifiers first
    pub toggle_keys: Vec<Key>,
    /// Vectors that count as an undo modifier press
    pub undo_modifiers: Vec<Modifiers>,
    pub undo_timeout: Duration,
    pub history_capacity: usize,
    /// Takeover auto-repeat from the config; `None` means ask xset
    pub repeat: Option<AutoRepeat>,
}

impl Config {
    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }

    /// The built-in tables used when no config file exists
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml(BUILTIN_CONFIG)
    }

    /// `$XDG_CONFIG_HOME/anykey/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("anykey").join("config.toml"))
    }

    /// Characters used by abbreviation expansions that no key can type
    pub fn unsendable_characters(&self) -> Vec<char> {
        let mut missing = Vec::new();
        for tier in self.abbreviations.tiers() {
            for abbr in tier {
                for c in abbr.expansion().chars() {
                    if self.send.stroke_for(c).is_none() && !missing.contains(&c) {
                        missing.push(c);
                    }
                }
            }
        }
        missing
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "device: {}", self.device.as_deref().unwrap_or("(none)"))?;
        writeln!(f, "caps-lock key: {}", self.capslock_key)?;
        write!(f, "toggle: ")?;
        for key in &self.toggle_keys {
            write!(f, "{} ", key)?;
        }
        writeln!(f)?;
        write!(f, "undo modifiers:")?;
        for mods in &self.undo_modifiers {
            write!(f, " {}", mods)?;
        }
        writeln!(f, " (timeout {} ms)", self.undo_timeout.as_millis())?;
        writeln!(f, "history capacity: {}", self.history_capacity)?;
        match self.repeat {
            Some(repeat) => writeln!(
                f,
                "repeat: delay {} ms, period {} ms",
                repeat.delay_ms, repeat.period_ms
            )?,
            None => writeln!(f, "repeat: from xset")?,
        }
        writeln!(
            f,
            "characters: {} entries in {} layers ({} sendable)",
            self.characters.len(),
            self.characters.layer_count(),
            self.send.len()
        )?;
        for (tier, entries) in self.abbreviations.tiers().iter().enumerate() {
            write!(f, "tier {}:", tier)?;
            for abbr in entries {
                write!(f, " {}->{}", abbr.trigger(), abbr.expansion())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl ConfigToml {
    /// Convert parsed TOML to the runtime Config
    fn to_config(&self) -> Result<Config, ConfigError> {
        let history_capacity = self
            .general
            .history_capacity
            .unwrap_or(DEFAULT_HISTORY_CAPACITY);
        if history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }

        let capslock_key = match &self.general.capslock_key {
            Some(name) => parse_key(name)?,
            None => Key::CAPSLOCK,
        };

        let mut modifier_keys = ModifierKeys::new();
        for (key_name, slot_name) in &self.modifiers {
            let key = parse_key(key_name)?;
            let slot = parse_slot(slot_name)?;
            modifier_keys.insert(key, slot);
        }

        // Toggle combination
        let mut toggle_modifiers = Modifiers::NONE;
        for name in &self.toggle.modifiers {
            toggle_modifiers = toggle_modifiers.with(parse_slot(name)?, true);
        }
        let toggle_key = parse_key(&self.toggle.key)?;
        let mut toggle_keys = Vec::new();
        for slot in toggle_modifiers.slots() {
            let key = modifier_keys
                .key_for(slot)
                .ok_or_else(|| ConfigError::UnmappedModifier(slot.to_string()))?;
            toggle_keys.push(key);
        }
        toggle_keys.push(toggle_key);

        // Undo modifiers
        let mut undo_modifiers = Vec::new();
        for name in &self.undo.modifier_keys {
            let key = parse_key(name)?;
            let slot = modifier_keys
                .slot_for(key)
                .ok_or_else(|| ConfigError::NotAModifierKey(key.to_string()))?;
            undo_modifiers.push(Modifiers::NONE.with(slot, true));
        }
        let undo_timeout = self
            .undo
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_UNDO_TIMEOUT);

        // Character table
        let mut characters = CharacterTable::new();
        for layer in &self.characters {
            let vectors = expand_modifiers(&layer.modifiers)?;
            for (key_name, value) in &layer.keys {
                let key = parse_key(key_name)?;
                let resolved = parse_character(key_name, value)?;
                for mods in &vectors {
                    characters.insert(*mods, key, resolved);
                }
            }
        }
        characters.insert(toggle_modifiers, toggle_key, Resolved::Toggle);

        // Abbreviations
        let mut tiers = Vec::with_capacity(self.abbreviations.len());
        for (tier, entries) in self.abbreviations.iter().enumerate() {
            let abbrs = entries
                .entries
                .iter()
                .map(|(trigger, expansion)| {
                    Abbreviation::new(trigger, expansion).ok_or(ConfigError::EmptyTrigger(tier))
                })
                .collect::<Result<Vec<_>, _>>()?;
            tiers.push(abbrs);
        }

        let repeat = self
            .repeat
            .as_ref()
            .map(|r| AutoRepeat::from_rate(r.delay_ms, r.rate_hz));

        let send = SendTable::build(&characters);

        let config = Config {
            device: self.general.device.clone(),
            characters,
            send,
            abbreviations: AbbreviationTable::new(tiers),
            modifier_keys,
            capslock_key,
            toggle_modifiers,
            toggle_key,
            toggle_keys,
            undo_modifiers,
            undo_timeout,
            history_capacity,
            repeat,
        };

        for c in config.unsendable_characters() {
            log::warn!("abbreviation output {:?} has no key in the character table", c);
        }

        log::debug!(
            "config loaded: {} characters, {} abbreviations in {} tiers",
            config.characters.len(),
            config.abbreviations.len(),
            config.abbreviations.tier_count()
        );

        Ok(config)
    }
}

/// Parse a key name into a Key
fn parse_key(name: &str) -> Result<Key, ConfigError> {
    let trimmed = name.trim();
    crate::key::key_from_name(trimmed).ok_or_else(|| ConfigError::InvalidKey(trimmed.to_string()))
}

fn parse_slot(name: &str) -> Result<ModifierSlot, ConfigError> {
    let trimmed = name.trim();
    trimmed
        .parse::<ModifierSlot>()
        .map_err(|_| ConfigError::InvalidModifier(trimmed.to_string()))
}

/// Parse a character table value. `<toggle>` is reserved for `[toggle]`.
fn parse_character(key_name: &str, value: &str) -> Result<Resolved, ConfigError> {
    match Resolved::parse(value) {
        Some(Resolved::Toggle) | None => Err(ConfigError::InvalidCharacter {
            key: key_name.to_string(),
            value: value.to_string(),
        }),
        Some(resolved) => Ok(resolved),
    }
}
