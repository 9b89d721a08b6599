// AnyKey CLI
// Abbreviation expansion and undo for a grabbed evdev keyboard

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use anykey_core::config::Config;
use anykey_core::{EventLoop, InputDevice};

/// Keyboard abbreviation expander with undo
#[derive(Parser, Debug)]
#[command(name = "anykey")]
#[command(version)]
#[command(about = "Keyboard abbreviation expander with undo", long_about = None)]
struct Args {
    /// Input device path (e.g. /dev/input/by-id/...-event-kbd)
    #[arg(short, long, value_name = "DEVICE")]
    device: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Print the resolved config and exit
    #[arg(long)]
    print_config: bool,

    /// List available keyboard devices
    #[arg(long)]
    list_devices: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Explicit path, else the default path if it exists, else the built-in tables
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::from_toml_path(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    if let Some(path) = Config::default_path().filter(|p| p.exists()) {
        log::info!("using config {}", path.display());
        return Config::from_toml_path(&path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    log::info!("no config file, using built-in tables");
    Config::builtin().context("built-in config is invalid")
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn list_devices() -> anyhow::Result<()> {
    let devices = InputDevice::list_keyboards();
    if devices.is_empty() {
        bail!("no keyboard devices found (are you in the input group?)");
    }
    for device in devices {
        println!("{}: {}", device.path.display(), device.name);
    }
    Ok(())
}

fn install_signal_handler(running: Arc<AtomicBool>) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("failed to install signal handler")?;
    std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            log::info!("received signal {}, shutting down", signal);
            running.store(false, Ordering::SeqCst);
        }
    });
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.list_devices {
        return list_devices();
    }

    let config = load_config(args.config.as_deref())?;

    if args.check_config {
        for c in config.unsendable_characters() {
            println!("warning: no key types {:?}", c);
        }
        println!("Configuration is valid");
        return Ok(());
    }

    if args.print_config {
        print!("{}", config);
        return Ok(());
    }

    let Some(device_path) = args.device.clone().or_else(|| config.device.clone()) else {
        bail!("no input device given; use --device or [general] device (see --list-devices)");
    };

    let mut event_loop = EventLoop::new(config, &device_path)
        .with_context(|| format!("failed to set up {}", device_path))?;

    let running = Arc::new(AtomicBool::new(true));
    install_signal_handler(running.clone())?;

    event_loop.run(&running).context("event loop failed")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(args)
}
