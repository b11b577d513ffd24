//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOAST_SECS: u64 = 3;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Portal REST API base URL (no trailing slash)
    pub api_url: String,
    /// Where the session keys are persisted
    pub state_file: PathBuf,
    /// Per-request timeout applied by the HTTP client
    pub http_timeout: Duration,
    /// How long a toast stays visible
    pub toast_delay: Duration,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_file: env::temp_dir().join("campus-portal-test.json"),
            http_timeout: Duration::from_secs(5),
            toast_delay: Duration::from_secs(DEFAULT_TOAST_SECS),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let state_file = match env::var("CAMPUS_STATE_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_state_file().ok_or(ConfigError::Missing("CAMPUS_STATE_FILE"))?,
        };

        Ok(Self {
            api_url: normalize_base_url(
                &env::var("CAMPUS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            ),
            state_file,
            http_timeout: Duration::from_secs(secs_var(
                "CAMPUS_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            toast_delay: Duration::from_secs(secs_var("CAMPUS_TOAST_SECS", DEFAULT_TOAST_SECS)?),
        })
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = normalize_base_url(url);
        self
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }
}

/// `<data dir>/campus-portal/session.json`
fn default_state_file() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("campus-portal").join("session.json"))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn secs_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: name,
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
