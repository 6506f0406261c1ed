use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, num::NonZeroUsize, path::PathBuf, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// endpoint = "https://api.openweathermap.org/data/2.5/weather"
/// timeout_secs = 10
/// concurrency = 8
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: Option<u64>,
    /// Upper bound on simultaneous requests in concurrent mode.
    pub concurrency: Option<usize>,
    /// Optional deadline for a whole batch.
    pub batch_timeout_secs: Option<u64>,
}

/// Validated, immutable settings handed to the fetcher and orchestrator.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub endpoint: Url,
    pub api_key: String,
    pub timeout: Duration,
    pub concurrency: NonZeroUsize,
    pub batch_deadline: Option<Duration>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate the stored values and freeze them into [`FetchSettings`].
    pub fn fetch_settings(&self) -> Result<FetchSettings, ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        let endpoint = parse_endpoint(self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))?;

        let concurrency = NonZeroUsize::new(self.concurrency.unwrap_or(DEFAULT_CONCURRENCY))
            .ok_or(ConfigError::InvalidConcurrency)?;

        let timeout = match self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => return Err(ConfigError::InvalidTimeout("timeout_secs")),
            secs => Duration::from_secs(secs),
        };

        let batch_deadline = match self.batch_timeout_secs {
            Some(0) => return Err(ConfigError::InvalidTimeout("batch_timeout_secs")),
            other => other.map(Duration::from_secs),
        };

        Ok(FetchSettings { endpoint, api_key, timeout, concurrency, batch_deadline })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key() -> Config {
        Config { api_key: Some("KEY".into()), ..Config::default() }
    }

    #[test]
    fn fetch_settings_errors_when_api_key_missing() {
        let err = Config::default().fetch_settings().unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains("Hint: run `weather configure`"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config { api_key: Some("   ".into()), ..Config::default() };
        assert!(!cfg.has_api_key());
        assert!(matches!(cfg.fetch_settings(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn fetch_settings_applies_defaults() {
        let settings = with_key().fetch_settings().expect("settings must be valid");

        assert_eq!(settings.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(settings.api_key, "KEY");
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.concurrency.get(), DEFAULT_CONCURRENCY);
        assert!(settings.batch_deadline.is_none());
    }

    #[test]
    fn fetch_settings_rejects_zero_concurrency() {
        let cfg = Config { concurrency: Some(0), ..with_key() };
        assert!(matches!(cfg.fetch_settings(), Err(ConfigError::InvalidConcurrency)));
    }

    #[test]
    fn fetch_settings_rejects_zero_timeouts() {
        let cfg = Config { timeout_secs: Some(0), ..with_key() };
        let err = cfg.fetch_settings().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout("timeout_secs")));

        let cfg = Config { batch_timeout_secs: Some(0), ..with_key() };
        let err = cfg.fetch_settings().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout("batch_timeout_secs")));
        assert!(err.to_string().contains("at least 1 second"));
    }

    #[test]
    fn fetch_settings_rejects_bad_endpoint() {
        let cfg = Config { endpoint: Some("not a url".into()), ..with_key() };
        assert!(matches!(cfg.fetch_settings(), Err(ConfigError::InvalidEndpoint { .. })));

        let cfg = Config { endpoint: Some("ftp://example.com/weather".into()), ..with_key() };
        let err = cfg.fetch_settings().unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config {
            endpoint: Some("http://localhost:8080/weather".into()),
            timeout_secs: Some(3),
            concurrency: Some(2),
            batch_timeout_secs: Some(30),
            ..with_key()
        };

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed, cfg);

        let settings = parsed.fetch_settings().expect("settings must be valid");
        assert_eq!(settings.batch_deadline, Some(Duration::from_secs(30)));
    }
}
