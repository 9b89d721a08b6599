// AnyKey Transform Module
// Event pipeline and the timing / suspend controllers it drives

pub mod engine;
pub mod suspend;
pub mod undo_timer;

pub use engine::{EngineError, TransformEngine};
pub use suspend::{SuspendContext, SuspendTransition};
pub use undo_timer::{UndoModTimer, DEFAULT_UNDO_TIMEOUT};
