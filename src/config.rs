//! Configuration file parser for the reading-list client.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields`
//! off).

use crate::feed::FeedOptions;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds the maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level client configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
///
/// Custom Debug impl masks `api_key` to prevent secret leakage in logs,
/// error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the article collection service.
    pub base_url: String,

    /// Articles requested per page (clamped to the backend's 1..=100 range).
    pub page_size: u32,

    /// Quiet period for the debounced search box, in milliseconds.
    pub debounce_ms: u64,

    /// Per-request timeout in seconds. A page load exceeding this budget
    /// fails with a network error rather than hanging.
    pub request_timeout_secs: u64,

    /// API key sent as `X-API-Key` (alternative to the BRIEF_API_KEY env
    /// var; the env var takes precedence).
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            page_size: 20,
            debounce_ms: 300,
            request_timeout_secs: 30,
            api_key: None,
        }
    }
}

/// Mask api_key in Debug output to prevent secret leakage.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("debounce_ms", &self.debounce_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Feed core tunables derived from this config.
    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            page_size: self.page_size.clamp(1, crate::remote::MAX_PAGE_SIZE),
            debounce: Duration::from_millis(self.debounce_ms),
            ..FeedOptions::default()
        }
    }

    /// Per-request timeout budget.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// API key with env var precedence over the config file.
    pub fn effective_api_key(&self) -> Option<String> {
        std::env::var("BRIEF_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Unique temp config file, removed on drop.
    struct TempConfig {
        path: PathBuf,
    }

    impl TempConfig {
        fn new(content: &str) -> Self {
            let n = COUNTER.fetch_add(1, Ordering::SeqCst);
            let path = std::env::temp_dir().join(format!(
                "brief-config-test-{}-{}.toml",
                std::process::id(),
                n
            ));
            std::fs::write(&path, content).unwrap();
            Self { path }
        }
    }

    impl Drop for TempConfig {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/brief-config.toml")).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let tmp = TempConfig::new("base_url = \"https://news.example.com\"\npage_size = 50\n");
        let config = Config::load(&tmp.path).unwrap();
        assert_eq!(config.base_url, "https://news.example.com");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let tmp = TempConfig::new("base_url = [unclosed");
        let err = Config::load(&tmp.path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let tmp = TempConfig::new("page_size = 0");
        let err = Config::load(&tmp.path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn debug_output_masks_api_key() {
        let config = Config {
            api_key: Some("super-secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn feed_options_clamp_page_size() {
        let config = Config {
            page_size: 500,
            ..Config::default()
        };
        assert_eq!(config.feed_options().page_size, 100);
    }

    #[test]
    fn oversized_file_is_rejected() {
        let tmp = TempConfig::new("");
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&tmp.path)
            .unwrap();
        let filler = vec![b'#'; 2 * 1024 * 1024];
        file.write_all(&filler).unwrap();

        let err = Config::load(&tmp.path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
    }
}
