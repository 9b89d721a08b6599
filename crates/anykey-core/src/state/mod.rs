// AnyKey Session State
// Keyboard state and the undo history owned by the engine

mod history;
mod keyboard;

pub use history::{HistoryEntry, HistoryLedger, UndoMode, UndoPlan, DEFAULT_HISTORY_CAPACITY};
pub use keyboard::KeyboardState;
