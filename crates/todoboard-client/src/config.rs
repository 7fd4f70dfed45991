use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Where the store lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads `TODOBOARD_API_BASE` and `TODOBOARD_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base) = lookup("TODOBOARD_API_BASE").filter(|v| !v.trim().is_empty()) {
            config.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("TODOBOARD_REQUEST_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "Ignoring invalid TODOBOARD_REQUEST_TIMEOUT_SECS"),
            }
        }

        config
    }
}
