// AnyKey Event Loop
// Reads the physical keyboard and drives the engine, one event at a time

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::config::Config;
use crate::input::{query_xset, DeviceControl, DeviceError, InputDevice};
use crate::output::{EventSink, OutputError, VirtualKeyboard};
use crate::transform::{EngineError, TransformEngine};

/// Poll timeout; bounds how long a shutdown request can go unnoticed
const POLL_TIMEOUT_MS: i32 = 100;

/// Result type for event loop operations
pub type EventLoopResult<T> = Result<T, EventLoopError>;

/// Errors that can occur in the event loop
#[derive(Debug, thiserror::Error)]
pub enum EventLoopError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Owns the input device, the virtual keyboard and the engine.
///
/// The pipeline starts suspended with the device not grabbed. Cleanup on
/// exit follows [`TransformEngine::shutdown`], also when dropped.
pub struct EventLoop {
    device: InputDevice,
    output: VirtualKeyboard,
    engine: TransformEngine,
    shut_down: bool,
}

impl EventLoop {
    /// Open `device_path` and create the virtual keyboard. Either failing
    /// is fatal.
    pub fn new(config: Config, device_path: &str) -> EventLoopResult<Self> {
        let device = InputDevice::open(device_path)?;
        log::info!("reading from {} ({})", device.name(), device.path());

        let output = VirtualKeyboard::new()?;

        let original = device.auto_repeat();
        let takeover = config.repeat.or_else(query_xset);
        log::debug!("auto-repeat original={:?} takeover={:?}", original, takeover);

        let mut engine = TransformEngine::new(config);
        engine.set_repeat(original, takeover);

        Ok(Self {
            device,
            output,
            engine,
            shut_down: false,
        })
    }

    /// Process events until `running` is cleared or an error occurs
    pub fn run(&mut self, running: &AtomicBool) -> EventLoopResult<()> {
        log::info!("suspended; press the toggle combination to start");

        let result = self.run_inner(running);
        self.shutdown();
        result
    }

    fn run_inner(&mut self, running: &AtomicBool) -> EventLoopResult<()> {
        while running.load(Ordering::SeqCst) {
            let events = self.device.poll_events(POLL_TIMEOUT_MS)?;
            for event in events {
                let now = Instant::now();
                self.engine
                    .process_event(event, now, &mut self.output, &mut self.device)?;
            }
        }
        log::info!("shutdown requested");
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if let Err(e) = self.output.flush() {
            log::warn!("failed to flush output: {}", e);
        }
        self.engine.shutdown(&mut self.device);
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
