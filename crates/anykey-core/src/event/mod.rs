// AnyKey Event Handling
// Blocking read loop over the physical keyboard

#[cfg(feature = "uinput")]
pub mod r#loop;

#[cfg(feature = "uinput")]
pub use r#loop::{EventLoop, EventLoopError, EventLoopResult};
