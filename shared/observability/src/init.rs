//! Tracing initialization for roadwatch binaries.
//!
//! Provides standardized tracing subscriber setup with JSON or pretty formatting.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

const DEFAULT_SERVICE: &str = "roadwatch";
const DEFAULT_LEVEL: &str = "info";

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Name attached to the startup event
    pub service_name: String,
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset, e.g. "roadwatch=debug,sqlx=warn"
    pub level: String,
    /// Whether to log span open/close events
    pub log_spans: bool,
    /// Whether to include file/line in logs
    pub include_location: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE.to_string(),
            format: LogFormat::default(),
            level: DEFAULT_LEVEL.to_string(),
            log_spans: false,
            include_location: true,
        }
    }
}

impl TracingConfig {
    /// Create config for a specific service
    pub fn for_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Reads `LOG_FORMAT`, `RUST_LOG`, `LOG_SPANS` and `LOG_LOCATION`.
    /// Unparseable values fall back to the defaults.
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let defaults = Self::for_service(service_name);
        Self {
            format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.format),
            level: env::var("RUST_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.level),
            log_spans: env_flag("LOG_SPANS").unwrap_or(defaults.log_spans),
            include_location: env_flag("LOG_LOCATION").unwrap_or(defaults.include_location),
            service_name: defaults.service_name,
        }
    }

    /// Set log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set format to JSON
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Set format to pretty (human-readable)
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Enable span logging
    pub fn with_spans(mut self) -> Self {
        self.log_spans = true;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// Installs the global subscriber.
///
/// Fails if a subscriber is already installed, so tests and embedding
/// binaries can call it more than once without panicking.
///
/// # Example
/// ```ignore
/// use roadwatch_observability::{init_tracing, TracingConfig};
///
/// init_tracing(TracingConfig::for_service("roadwatch").json())?;
/// ```
pub fn init_tracing(config: TracingConfig) -> Result<(), TryInitError> {
    let filter = config.filter();

    let span_events = if config.log_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_current_span(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
    }

    tracing::info!(
        service = %config.service_name,
        format = %config.format,
        "Tracing initialized"
    );
    Ok(())
}

/// Initialize tracing based on environment variables only
pub fn init_tracing_from_env(service_name: &str) -> Result<(), TryInitError> {
    init_tracing(TracingConfig::from_env(service_name))
}
