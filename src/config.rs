//! Runtime configuration.

use derive_getters::Getters;
use tracing::debug;

/// Service root used when nothing else is configured. Matches the opponent
/// service's default bind address.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the service root.
pub const SERVICE_URL_VAR: &str = "TICMYTOE_SERVICE_URL";

/// Resolved settings for one run.
#[derive(Debug, Clone, Getters)]
pub struct Config {
    /// Base URL of the opponent service.
    service_url: String,
}

impl Config {
    /// Resolves settings: an explicit flag wins over the environment, which
    /// wins over the default.
    pub fn resolve(flag: Option<String>) -> Self {
        Self::from_sources(flag, std::env::var(SERVICE_URL_VAR).ok())
    }

    fn from_sources(flag: Option<String>, env: Option<String>) -> Self {
        let service_url = flag
            .or(env)
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        debug!(%service_url, "resolved configuration");
        Self { service_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_environment() {
        let config = Config::from_sources(
            Some("http://flag:1".to_string()),
            Some("http://env:2".to_string()),
        );
        assert_eq!(config.service_url(), "http://flag:1");
    }

    #[test]
    fn test_environment_wins_over_default() {
        let config = Config::from_sources(None, Some("http://env:2".to_string()));
        assert_eq!(config.service_url(), "http://env:2");
    }

    #[test]
    fn test_default_applies_last() {
        let config = Config::from_sources(None, None);
        assert_eq!(config.service_url(), DEFAULT_SERVICE_URL);
    }
}
