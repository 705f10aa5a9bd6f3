//! Logging setup for hosts embedding lull.
//!
//! Format is controlled via `LULL_LOG_FORMAT`:
//! - `json` - Structured JSON output (for ELK/Loki)
//! - `pretty` - Human-readable output (default on a TTY)
//! - `compact` - Compact single-line format
//!
//! # Example
//!
//! ```ignore
//! use lull_core::observability::{TracingConfig, init_tracing};
//!
//! init_tracing(TracingConfig::from_env()?)?;
//! ```

mod config;
mod tracing_setup;

pub use config::{
    DEFAULT_FILTER, FILTER_VAR, FORMAT_VAR, LOCATION_VAR, LogFormat, TracingConfig,
};
pub use tracing_setup::init_tracing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.filter, DEFAULT_FILTER);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(!config.with_location);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("verbose".parse::<LogFormat>().is_err());
    }
}
