//! Client configuration loaded from environment variables.
//!
//! Everything here has a production default; env vars exist so staging
//! backends and test harnesses can redirect the client.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Production backend base URL.
const DEFAULT_API_URL: &str = "https://api.paceline.com";

/// Subscription product identifier known to the store platform.
const DEFAULT_PRODUCT_ID: &str = "paceline.pro.subscription";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (no trailing slash).
    pub api_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Maximum concurrent requests to the backend host.
    pub max_connections: usize,
    /// Profile cache time-to-live.
    pub profile_cache_ttl: Duration,
    /// In-app-purchase product identifier for the premium subscription.
    pub premium_product_id: String,
    /// Where the session file (token, user id, auth method) is persisted.
    pub session_file: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_connections: 6,
            profile_cache_ttl: Duration::from_secs(300),
            premium_product_id: DEFAULT_PRODUCT_ID.to_string(),
            session_file: std::env::temp_dir().join("paceline-session.json"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("PACELINE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let profile_cache_ttl = env::var("PACELINE_PROFILE_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(300));

        let session_file = match env::var("PACELINE_SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file()?,
        };

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_connections: 6,
            profile_cache_ttl,
            premium_product_id: env::var("PACELINE_PREMIUM_PRODUCT_ID")
                .unwrap_or_else(|_| DEFAULT_PRODUCT_ID.to_string()),
            session_file,
        })
    }
}

/// Per-user data path for the session file.
fn default_session_file() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("com", "paceline", "paceline")
        .ok_or(ConfigError::NoHomeDirectory)?;
    Ok(dirs.data_dir().join("session.json"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine a home directory for session storage")]
    NoHomeDirectory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api_url, "https://api.paceline.com");
        assert_eq!(config.max_connections, 6);
        assert_eq!(config.profile_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_env_overrides() {
        env::set_var("PACELINE_API_URL", "http://localhost:9999/");
        env::set_var("PACELINE_PROFILE_CACHE_TTL_SECS", "60");
        env::set_var("PACELINE_SESSION_FILE", "/tmp/paceline-test-session.json");

        let config = Config::from_env().expect("Config should load");

        // Trailing slash is stripped so endpoint paths join cleanly
        assert_eq!(config.api_url, "http://localhost:9999");
        assert_eq!(config.profile_cache_ttl, Duration::from_secs(60));
        assert_eq!(
            config.session_file,
            PathBuf::from("/tmp/paceline-test-session.json")
        );

        env::remove_var("PACELINE_API_URL");
        env::remove_var("PACELINE_PROFILE_CACHE_TTL_SECS");
        env::remove_var("PACELINE_SESSION_FILE");
    }
}
