// AnyKey Output Layer
// Key state tracking, text synthesis, and the virtual output device

mod sink;
mod state;
mod synth;

#[cfg(feature = "uinput")]
mod uinput;

pub use sink::{EventSink, OutputError};
pub use state::PressedKeyState;
pub use synth::Synthesizer;

#[cfg(feature = "uinput")]
pub use uinput::VirtualKeyboard;
