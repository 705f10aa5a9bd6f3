//! Tracing subscriber setup with format selection.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::config::DEFAULT_FILTER;
use super::{LogFormat, TracingConfig};

/// Install the global tracing subscriber.
///
/// Filter directives that do not parse fall back to the default filter. Fails
/// if a global subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let location = config.with_location;

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(location)
                    .with_line_number(location)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(location)
                    .with_line_number(location),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_file(location)
                    .with_line_number(location),
            )
            .try_init(),
    }
    .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(format = ?config.format, filter = %config.filter, "Tracing initialized");
    Ok(())
}
