//! replica daemon: installs the global input hook and binds record/playback
//! key combinations from the config file.

use anyhow::{Context, Result};
use clap::Parser;
use replica_core::{
    Dispatcher, Imitator, Injector, NoopInjector, Notifier, Point, ReleasedProbe, TracingNotifier,
};
use replica_platform::{start_input_hook, EnigoInjector, SystemKeyProbe};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

mod config;
mod logging;

use crate::config::AppConfig;

/// Global hotkeys that record input sessions to files and replay them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: <data dir>/replica/config.yaml)
    #[arg(short, long, env = "REPLICA_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and bindings, then exit
    #[arg(long)]
    check: bool,

    /// Directory for daily log files (overrides the config file)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => config::default_path()?,
    };
    let loaded = AppConfig::load(&config_path)?;

    let log_dir = args
        .log_dir
        .or_else(|| loaded.config.logging.directory.clone());
    logging::setup(&loaded.config.logging.level, log_dir.as_deref());
    info!(config = %config_path.display(), "Starting replica...");
    loaded.report();
    let config = loaded.config;

    if args.check {
        let dispatcher = Dispatcher::new(&config.dispatcher, &ReleasedProbe, Point::default());
        let imitator = bind(&config, dispatcher.clone(), Arc::new(NoopInjector))?;
        info!(triggers = dispatcher.registry().len(), "configuration is valid");
        drop(imitator);
        return Ok(());
    }

    let injector = Arc::new(EnigoInjector::new().context("failed to create input injector")?);
    let position = injector.cursor_position().unwrap_or_else(|e| {
        warn!(error = %e, "could not read the cursor position");
        Point::default()
    });
    let dispatcher = Dispatcher::new(&config.dispatcher, &SystemKeyProbe, position);
    let imitator = bind(&config, dispatcher.clone(), injector)?;

    let hook = start_input_hook(dispatcher).context("failed to install the input hook")?;
    info!("replica running");
    hook.wait();

    imitator.player().stop_all();
    info!("replica shutdown complete");
    Ok(())
}

/// Register every configured recording and playback binding.
fn bind(
    config: &AppConfig,
    dispatcher: Dispatcher,
    injector: Arc<dyn Injector>,
) -> Result<Imitator> {
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let imitator = Imitator::new(dispatcher, config.player.clone(), injector, notifier);

    for binding in &config.recordings {
        imitator
            .record(&binding.path, &binding.start, &binding.stop)
            .with_context(|| format!("recording binding for {}", binding.path.display()))?;
    }
    for binding in &config.playbacks {
        imitator
            .play(&binding.path, &binding.start, &binding.stop)
            .with_context(|| format!("playback binding for {}", binding.path.display()))?;
    }
    Ok(imitator)
}
