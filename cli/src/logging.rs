//! Logging setup: console output plus optional daily log files.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("replica={level}")))
}

/// Initialize logging with console and optional file output.
///
/// `RUST_LOG` overrides `level` for both outputs.
pub fn setup(level: &str, directory: Option<&Path>) {
    // Console layer (always enabled)
    let console_layer = fmt::layer().with_target(true).with_filter(filter(level));

    let file_layer = directory.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "Warning: Failed to create log directory {}: {}",
                dir.display(),
                e
            );
            return None;
        }
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "replica.log");
        Some(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_appender)
                .with_filter(filter(level)),
        )
    });

    let result = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {e}");
        return;
    }

    if let Some(dir) = directory {
        tracing::info!("File logging enabled: {}", dir.display());
    }
    tracing::info!(level, "Logging initialized");
}
