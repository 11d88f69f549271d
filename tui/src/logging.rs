//! File logging. The terminal belongs to the UI, so nothing is written to it.

use std::fs;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(config: &LogConfig) -> anyhow::Result<WorkerGuard> {
    fs::create_dir_all(&config.directory)
        .with_context(|| format!("creating log directory {}", config.directory.display()))?;

    let appender = tracing_appender::rolling::never(&config.directory, &config.file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("invalid log filter '{}'", config.filter))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}
