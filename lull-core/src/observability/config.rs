//! Logging configuration for hosts that embed lull.
//!
//! lull only emits events; it never installs a subscriber by itself. A host
//! without logging of its own calls [`init_tracing`](super::init_tracing) once
//! at startup, usually with [`TracingConfig::from_env`].

use crate::error::{LullError, Result};
use std::env;
use std::io::IsTerminal;
use std::str::FromStr;

/// Selects the output format: `json`, `pretty` or `compact`.
pub const FORMAT_VAR: &str = "LULL_LOG_FORMAT";
/// Filter directives; falls back to `RUST_LOG`, then [`DEFAULT_FILTER`].
pub const FILTER_VAR: &str = "LULL_LOG_LEVEL";
/// `true`/`1` adds file and line to every event.
pub const LOCATION_VAR: &str = "LULL_LOG_LOCATION";

/// Wait begin/resume/cancel events are `info`/`warn` in `lull_nodes`; the
/// test host and clock only log at `debug`.
pub const DEFAULT_FILTER: &str = "warn,lull_nodes=info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened.
    Json,
    /// Multi-line human-readable output.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
}

impl LogFormat {
    /// `Pretty` when stderr is a terminal, `Json` when it is piped into a
    /// collector.
    pub fn for_stderr() -> Self {
        if std::io::stderr().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = LullError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(LullError::ConfigValue {
                field: FORMAT_VAR.to_string(),
                cause: format!("expected json, pretty or compact, got {other:?}"),
            }),
        }
    }
}

/// How [`init_tracing`](super::init_tracing) sets up the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `debug` or `warn,lull_nodes=trace`.
    pub filter: String,
    /// Include file and line in events.
    pub with_location: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new(LogFormat::default())
    }
}

impl TracingConfig {
    /// Config with the given format and the default filter.
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            filter: DEFAULT_FILTER.to_string(),
            with_location: false,
        }
    }

    /// Replace the filter directives.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Toggle file and line output.
    pub fn with_location(mut self, enabled: bool) -> Self {
        self.with_location = enabled;
        self
    }

    /// Read [`FORMAT_VAR`], [`FILTER_VAR`] (or `RUST_LOG`) and [`LOCATION_VAR`].
    ///
    /// Unset variables take their defaults. A variable that is set but
    /// unreadable is a configuration error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let format = match lookup(FORMAT_VAR) {
            Some(value) => value.parse()?,
            None => LogFormat::for_stderr(),
        };

        let filter = lookup(FILTER_VAR)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let with_location = match lookup(LOCATION_VAR).as_deref().map(str::trim) {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(LullError::ConfigValue {
                    field: LOCATION_VAR.to_string(),
                    cause: format!("expected true or false, got {other:?}"),
                });
            }
        };

        Ok(Self {
            format,
            filter,
            with_location,
        })
    }
}
