//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use domain::DEFAULT_INTERNAL_STORE_ID;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parses a `LOG_FORMAT` value. Anything but `json` means text.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default `"0.0.0.0"`)
/// - `PORT`: listen port (default `5050`)
/// - `RUST_LOG`: tracing filter directive (default `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default `text`)
/// - `MARKETPLACE_URL`: external marketplace base URL (default `"http://localhost:9090"`)
/// - `INTERNAL_STORE_ID`: store id of the internal catalog (default `"ONBQ"`)
/// - `REQUEST_TIMEOUT_MS`: deadline for one PlaceOrder call (default `10000`)
/// - `SHOPS_FILE`: optional JSON shop directory served by `/product/{id}`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub marketplace_url: String,
    pub internal_store_id: String,
    pub request_timeout: Duration,
    pub shops_file: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            marketplace_url: lookup("MARKETPLACE_URL").unwrap_or(defaults.marketplace_url),
            internal_store_id: lookup("INTERNAL_STORE_ID")
                .filter(|id| !id.is_empty())
                .unwrap_or(defaults.internal_store_id),
            request_timeout: lookup("REQUEST_TIMEOUT_MS")
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            shops_file: lookup("SHOPS_FILE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            marketplace_url: "http://localhost:9090".to_string(),
            internal_store_id: DEFAULT_INTERNAL_STORE_ID.to_string(),
            request_timeout: Duration::from_secs(10),
            shops_file: None,
        }
    }
}
