// AnyKey Output Sink
// Seam between the pipeline and the virtual output device

use crate::input::RawEvent;
use crate::{Action, Key};

/// Error types for output operations
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to write event: {0}")]
    WriteError(String),
}

/// Receiver of the transformed event stream.
///
/// Events must reach the downstream consumer in call order.
pub trait EventSink {
    /// Pass an input event through unchanged
    fn forward(&mut self, event: RawEvent) -> Result<(), OutputError>;

    /// Emit a synthesized key event
    fn key(&mut self, key: Key, action: Action) -> Result<(), OutputError>;

    /// Write out anything still held back. Sinks that emit immediately
    /// have nothing to do.
    fn flush(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    /// Press and release `key`
    fn tap(&mut self, key: Key) -> Result<(), OutputError> {
        self.key(key, Action::Press)?;
        self.key(key, Action::Release)
    }
}
