use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads `TODOBOARD_BIND_ADDR`, `TODOBOARD_DATA_DIR` and
    /// `TODOBOARD_ALLOWED_ORIGIN`, keeping defaults for anything unset or invalid.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("TODOBOARD_BIND_ADDR") {
            match raw.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => warn!(
                    value = %raw,
                    error = %e,
                    default = DEFAULT_BIND_ADDR,
                    "Ignoring invalid TODOBOARD_BIND_ADDR"
                ),
            }
        }
        if let Some(dir) = lookup("TODOBOARD_DATA_DIR").filter(|v| !v.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(origin) = lookup("TODOBOARD_ALLOWED_ORIGIN").filter(|v| !v.is_empty()) {
            config.allowed_origin = origin;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = ServerConfig::from_lookup(|key| match key {
            "TODOBOARD_BIND_ADDR" => Some("not an address".to_string()),
            "TODOBOARD_DATA_DIR" => Some("/var/lib/todoboard".to_string()),
            _ => None,
        });
        assert_eq!(config.bind_addr, ServerConfig::default().bind_addr);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/todoboard"));
        assert_eq!(config.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
    }
}
