//! Web application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `HOMECARE_HOST` - Bind address (default: 127.0.0.1)
//! - `HOMECARE_PORT` - Listen port (default: 3000)
//! - `HOMECARE_BASE_URL` - Public URL (default: `http://localhost:3000`);
//!   an `https://` URL turns on secure cookies
//! - `HOMECARE_DATA_DIR` - Persist profiles as JSON files in this directory
//!   instead of memory
//! - `HOMECARE_PROFILE` - Pin every request to one profile (kiosk mode)
//! - `HOMECARE_LOGIN_DELAY_MS` - Simulated login latency (default: 1200)
//! - `HOMECARE_ADMIN_LOGIN_DELAY_MS` - Admin quick login latency (default: 1500)
//! - `HOMECARE_ACCOUNT_DELAY_MS` - Account creation latency (default: 1000)
//! - `HOMECARE_ANALYSIS_DELAY_MS` - Photo analysis latency (default: 3000)
//! - `HOMECARE_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// Simulated latencies of the mock login and analysis flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    pub login: Duration,
    pub admin_login: Duration,
    pub account: Duration,
    pub analysis: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(1200),
            admin_login: Duration::from_millis(1500),
            account: Duration::from_millis(1000),
            analysis: Duration::from_millis(3000),
        }
    }
}

impl Delays {
    /// No waiting at all; used by tests.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            login: Duration::ZERO,
            admin_login: Duration::ZERO,
            account: Duration::ZERO,
            analysis: Duration::ZERO,
        }
    }
}

/// Web application configuration.
///
/// Implements `Debug` manually to redact the Sentry DSN.
#[derive(Clone)]
pub struct HomecareConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Directory for the file store; memory store when unset
    pub data_dir: Option<PathBuf>,
    /// Profile used for every request; per-browser profiles when unset
    pub fixed_profile: Option<String>,
    pub delays: Delays,
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for HomecareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomecareConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("data_dir", &self.data_dir)
            .field("fixed_profile", &self.fixed_profile)
            .field("delays", &self.delays)
            .field("log_format", &self.log_format)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("sentry_sample_rate", &self.sentry_sample_rate)
            .field("sentry_traces_sample_rate", &self.sentry_traces_sample_rate)
            .finish()
    }
}

impl Default for HomecareConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            data_dir: None,
            fixed_profile: None,
            delays: Delays::default(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl HomecareConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("HOMECARE_HOST", "127.0.0.1")?;
        let port = parse_env("HOMECARE_PORT", "3000")?;
        let base_url = get_env_or_default("HOMECARE_BASE_URL", "http://localhost:3000");
        let data_dir = get_optional_env("HOMECARE_DATA_DIR").map(PathBuf::from);
        let fixed_profile = get_optional_env("HOMECARE_PROFILE");
        if let Some(profile) = &fixed_profile {
            crate::store::validate_component(profile).map_err(|e| {
                ConfigError::InvalidEnvVar("HOMECARE_PROFILE".to_string(), e.to_string())
            })?;
        }

        let delays = Delays {
            login: parse_millis("HOMECARE_LOGIN_DELAY_MS", 1200)?,
            admin_login: parse_millis("HOMECARE_ADMIN_LOGIN_DELAY_MS", 1500)?,
            account: parse_millis("HOMECARE_ACCOUNT_DELAY_MS", 1000)?,
            analysis: parse_millis("HOMECARE_ANALYSIS_DELAY_MS", 3000)?,
        };

        let log_format = parse_env("HOMECARE_LOG_FORMAT", "text")?;

        let sentry_dsn = get_optional_env("SENTRY_DSN").map(SecretString::from);
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_env("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            data_dir,
            fixed_profile,
            delays,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a millisecond duration variable.
fn parse_millis(key: &str, default: u64) -> Result<Duration, ConfigError> {
    let millis: u64 = parse_env(key, &default.to_string())?;
    Ok(Duration::from_millis(millis))
}
