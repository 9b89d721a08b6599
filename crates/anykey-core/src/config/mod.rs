// AnyKey Config
// TOML loading and modifier list expansion

pub mod expander;
pub mod parser;

pub use expander::expand_modifiers;
pub use parser::{Config, ConfigError, ConfigToml};
