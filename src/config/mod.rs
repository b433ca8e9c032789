use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the Webshare API key
pub const API_KEY_ENV: &str = "WEBSHARE_API_KEY";

/// Upper bound for any configured random wait, in seconds
pub const MAX_WAIT_SECS: f64 = 3600.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Proxy provider settings
    pub proxy: ProxyConfig,

    /// Retry and backoff policy
    pub retry: RetryConfig,

    /// Transcript request settings
    pub transcript: TranscriptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Webshare proxy list endpoint
    pub api_url: String,

    /// API key; never read from or written to the config file
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Proxy list mode requested from the provider
    pub mode: String,

    /// Number of proxies requested per run
    pub page_size: u32,

    /// Host used when the provider omits `proxy_address` (backbone mode)
    pub backbone_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts
    pub attempts: u32,

    /// Jitter window applied before every attempt after the first
    pub jitter_min_secs: f64,
    pub jitter_max_secs: f64,

    /// Base of the exponential backoff for rate-limit failures
    pub rate_limit_base_secs: u64,

    /// Random delay window for unclassified failures
    pub unknown_delay_min_secs: f64,
    pub unknown_delay_max_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Language preference order, first match wins
    pub languages: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_url: "https://proxy.webshare.io/api/v2/proxy/list/".to_string(),
            api_key: None,
            mode: "backbone".to_string(),
            page_size: 25,
            backbone_host: "p.webshare.io".to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            jitter_min_secs: 1.0,
            jitter_max_secs: 3.0,
            rate_limit_base_secs: 30,
            unknown_delay_min_secs: 2.0,
            unknown_delay_max_secs: 5.0,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
        }
    }
}

impl RetryConfig {
    /// Exponential wait after a rate-limit failure on attempt `attempt` (0-based)
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_secs(self.rate_limit_base_secs.saturating_mul(factor))
    }
}

impl Config {
    /// Load configuration from an explicit file, the default locations, or built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::config_path().filter(|path| path.exists()),
        };

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Get configuration file path
    fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("transcript-fetch").join("config.yaml"))
    }

    /// Attach the proxy API key, ignoring blank values
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.proxy.api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        self
    }

    /// Override the number of attempts
    pub fn with_attempts(mut self, attempts: Option<u32>) -> Self {
        if let Some(attempts) = attempts {
            self.retry.attempts = attempts;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let retry = &self.retry;

        check_window("jitter", retry.jitter_min_secs, retry.jitter_max_secs)?;
        check_window("retry delay", retry.unknown_delay_min_secs, retry.unknown_delay_max_secs)?;

        if self.transcript.languages.is_empty() {
            anyhow::bail!("At least one transcript language must be configured");
        }

        url::Url::parse(&self.proxy.api_url)
            .with_context(|| format!("Invalid proxy API URL: {}", self.proxy.api_url))?;

        Ok(())
    }
}

/// A wait window must be finite, ordered and within `0..=MAX_WAIT_SECS`
fn check_window(name: &str, min_secs: f64, max_secs: f64) -> Result<()> {
    let in_range = |secs: f64| secs.is_finite() && (0.0..=MAX_WAIT_SECS).contains(&secs);
    if !(in_range(min_secs) && in_range(max_secs) && min_secs <= max_secs) {
        anyhow::bail!(
            "Invalid {} window: {}..{} seconds (limit {})",
            name,
            min_secs,
            max_secs,
            MAX_WAIT_SECS
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.proxy.page_size, 25);
        assert_eq!(config.proxy.mode, "backbone");
        assert_eq!(config.transcript.languages, vec!["en", "en-US", "en-GB"]);
        assert!(config.proxy.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rate_limit_backoff_doubles() {
        let retry = RetryConfig::default();
        assert_eq!(retry.rate_limit_backoff(0), Duration::from_secs(30));
        assert_eq!(retry.rate_limit_backoff(1), Duration::from_secs(60));
        assert_eq!(retry.rate_limit_backoff(2), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retry:\n  attempts: 5\ntranscript:\n  languages: [de, en]").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.rate_limit_base_secs, 30);
        assert_eq!(config.transcript.languages, vec!["de", "en"]);
        assert_eq!(config.proxy.page_size, 25);
    }

    #[test]
    fn test_api_key_is_not_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "proxy:\n  api_key: secret").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.proxy.api_key.is_none());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_invalid_window_rejected() {
        let mut config = Config::default();
        config.retry.jitter_min_secs = 4.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.transcript.languages.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unbounded_window_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retry:\n  jitter_max_secs: .inf").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.retry.jitter_max_secs.is_infinite());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jitter"));

        let mut config = Config::default();
        config.retry.unknown_delay_max_secs = 1e300;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retry.unknown_delay_min_secs = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retry.jitter_max_secs = MAX_WAIT_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_api_key(Some("  ".to_string()))
            .with_attempts(Some(7));
        assert!(config.proxy.api_key.is_none());
        assert_eq!(config.retry.attempts, 7);

        let config = Config::default().with_api_key(Some("abcdef".to_string()));
        assert_eq!(config.proxy.api_key.as_deref(), Some("abcdef"));
    }
}
