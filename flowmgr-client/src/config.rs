//! Client configuration.

use std::env;
use std::time::Duration;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "N8N_API_KEY";
/// Environment variable holding the server base URL.
pub const BASE_URL_ENV: &str = "N8N_BASE_URL";

const TIMEOUT_ENV: &str = "N8N_TIMEOUT";
const MAX_RETRIES_ENV: &str = "N8N_MAX_RETRIES";
const POLL_INTERVAL_ENV: &str = "N8N_POLL_INTERVAL";
const POLL_TIMEOUT_ENV: &str = "N8N_POLL_TIMEOUT";

/// Connection and polling settings for a [`Client`](crate::Client).
///
/// # Example
///
/// ```
/// use flowmgr_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("http://localhost:5678", "secret")
///     .with_timeout(Duration::from_secs(10))
///     .with_poll_interval(Duration::from_millis(500));
/// assert_eq!(config.max_retries, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API key sent in the `X-N8N-API-KEY` header.
    pub api_key: Option<String>,
    /// Server base URL, without the `/api/v1` suffix.
    pub base_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Connection attempts retried before a request fails.
    pub max_retries: u32,
    /// Default delay between execution status polls.
    pub poll_interval: Duration,
    /// Default deadline for waiting on an execution.
    pub poll_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            poll_interval: Duration::from_secs(2),
            poll_timeout: Duration::from_secs(300),
        }
    }
}

impl ClientConfig {
    /// Configuration for the given server and key, other settings at their defaults.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `N8N_API_KEY`, `N8N_BASE_URL`
    /// - `N8N_TIMEOUT`, `N8N_POLL_INTERVAL`, `N8N_POLL_TIMEOUT` (seconds)
    /// - `N8N_MAX_RETRIES`
    ///
    /// Unparseable numbers fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let seconds = |key: &str, fallback: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            api_key: lookup(API_KEY_ENV).filter(|v| !v.is_empty()),
            base_url: lookup(BASE_URL_ENV).filter(|v| !v.is_empty()),
            timeout: seconds(TIMEOUT_ENV, defaults.timeout),
            max_retries: lookup(MAX_RETRIES_ENV)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_retries),
            poll_interval: seconds(POLL_INTERVAL_ENV, defaults.poll_interval),
            poll_timeout: seconds(POLL_TIMEOUT_ENV, defaults.poll_timeout),
        }
    }

    /// Override the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of connection retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the default poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the default poll timeout.
    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}
