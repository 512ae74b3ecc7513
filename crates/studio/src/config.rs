use std::str::FromStr;
use std::time::Duration;

use designflow_client::poller::PollConfig;
use designflow_core::layout::{LayoutConfig, DEFAULT_NODE_SPACING_X, DEFAULT_NODE_SPACING_Y};

/// Default backend base URL, including the API prefix.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

/// An environment variable held a value that could not be used.
#[derive(Debug, thiserror::Error)]
#[error("{name} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub name: &'static str,
    pub expected: &'static str,
    pub value: String,
}

/// Studio configuration loaded from environment variables.
///
/// Every field has a default suitable for a backend running locally.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Backend base URL (default: `http://localhost:5000/api`).
    pub api_url: String,
    /// Bearer token sent on every request, if set.
    pub api_token: Option<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub poll: PollConfig,
    pub layout: LayoutConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poll: PollConfig {
                interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
                max_attempts: None,
            },
            layout: LayoutConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Load configuration from the process environment (and `.env`).
    ///
    /// | Env Var                | Default                     |
    /// |------------------------|-----------------------------|
    /// | `DESIGN_API_URL`       | `http://localhost:5000/api` |
    /// | `DESIGN_API_TOKEN`     | unset                       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                        |
    /// | `POLL_INTERVAL_MS`     | `3000`                      |
    /// | `POLL_MAX_ATTEMPTS`    | unset (poll until terminal) |
    /// | `LAYOUT_SPACING_X`     | `320`                       |
    /// | `LAYOUT_SPACING_Y`     | `260`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = var("DESIGN_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError {
                name: "DESIGN_API_URL",
                expected: "an http(s) URL",
                value: api_url,
            });
        }

        let request_timeout_secs = parse_positive(
            "REQUEST_TIMEOUT_SECS",
            var("REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let poll_interval_ms = parse_positive(
            "POLL_INTERVAL_MS",
            var("POLL_INTERVAL_MS"),
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        let max_attempts = var("POLL_MAX_ATTEMPTS")
            .map(|raw| parse_positive("POLL_MAX_ATTEMPTS", Some(raw), 0u32))
            .transpose()?;

        let node_spacing_x = parse_spacing(
            "LAYOUT_SPACING_X",
            var("LAYOUT_SPACING_X"),
            DEFAULT_NODE_SPACING_X,
        )?;
        let node_spacing_y = parse_spacing(
            "LAYOUT_SPACING_Y",
            var("LAYOUT_SPACING_Y"),
            DEFAULT_NODE_SPACING_Y,
        )?;

        Ok(Self {
            api_url,
            api_token: var("DESIGN_API_TOKEN"),
            request_timeout_secs,
            poll: PollConfig {
                interval: Duration::from_millis(poll_interval_ms),
                max_attempts,
            },
            layout: LayoutConfig {
                node_spacing_x,
                node_spacing_y,
            },
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_positive<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError {
            name,
            expected: "a positive integer",
            value: raw,
        }),
    }
}

fn parse_spacing(name: &'static str, raw: Option<String>, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ConfigError {
            name,
            expected: "a positive number",
            value: raw,
        }),
    }
}
