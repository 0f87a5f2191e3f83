// crates/client/src/config.rs
use std::time::Duration;

/// Default backend for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default spacing between scheduled status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings for the summarization backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; a trailing slash is tolerated.
    pub base_url: String,
    /// Fixed spacing between status checks while a job is live.
    pub poll_interval: Duration,
    /// Timeout for control-plane calls (credential, registration, poll).
    pub request_timeout: Duration,
    /// Timeout for the byte transfer; large media takes a while.
    pub upload_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Defaults with the base URL taken from `PODSUM_API_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("PODSUM_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.upload_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::default()
            .with_base_url("http://backend:9000/")
            .with_poll_interval(Duration::from_millis(50))
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "http://backend:9000/");
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
