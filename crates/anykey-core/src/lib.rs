// AnyKey Core Library
// Abbreviation expansion and undo between a physical and a virtual keyboard

pub mod abbrev;
pub mod action;
pub mod config;
pub mod event;
pub mod input;
pub mod key;
pub mod mapping;
pub mod modifier;
pub mod output;
pub mod state;
pub mod testing;
pub mod transform;

pub use abbrev::{AbbrevId, Abbreviation, AbbreviationTable, Completion, MatchCandidate, Matcher};
pub use action::Action;
pub use config::{Config, ConfigError};
pub use input::{AutoRepeat, DeviceControl, DeviceError, RawEvent};
pub use key::{key_from_name, Key};
pub use mapping::{CharacterTable, Resolved, SendTable, Stroke};
pub use modifier::{ModifierKeys, ModifierSlot, Modifiers};
pub use output::{EventSink, OutputError, PressedKeyState, Synthesizer};
pub use state::{HistoryEntry, HistoryLedger, KeyboardState, UndoMode, UndoPlan};
pub use transform::{EngineError, TransformEngine};

#[cfg(feature = "uinput")]
pub use event::{EventLoop, EventLoopError, EventLoopResult};
#[cfg(feature = "uinput")]
pub use input::InputDevice;
#[cfg(feature = "uinput")]
pub use output::VirtualKeyboard;
