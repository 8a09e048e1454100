use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::state::DEFAULT_STATE_FILE;

const ENV_FILE: &str = ".env";
pub const DEFAULT_CONFIG_FILE: &str = "ipo-notifier.toml";

pub const FEED_URL_VAR: &str = "IPO_NEWS_URL";
pub const WEBHOOK_URL_VAR: &str = "DISCORD_WEBHOOK_URL";

/// Optional on-disk settings. Every field has a default, so a missing file is fine.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log to this file instead of stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

fn default_log_filter() -> String {
    "ipo_notifier=info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))?;
        Ok(config)
    }

    /// Like [`Config::load`], but a file that does not exist yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        load_env_file_from(Path::new(ENV_FILE));
    }
}

pub fn load_env_file_from(path: &Path) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };
    // Strip BOM if present (common on Windows-created files)
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    for line in content.lines() {
        let line = line.trim().trim_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set in environment variables")]
    Missing(&'static str),
}

/// The two endpoints every run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub feed_url: String,
    pub webhook_url: String,
}

impl Endpoints {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| sanitize_value(&v))
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        Ok(Self {
            feed_url: required(FEED_URL_VAR)?,
            webhook_url: required(WEBHOOK_URL_VAR)?,
        })
    }
}

/// Strip carriage returns, BOM, and other invisible chars from a value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.state.path, PathBuf::from("last_ipo_state.json"));
        assert_eq!(config.logging.filter, "ipo_notifier=info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.state.path, PathBuf::from(DEFAULT_STATE_FILE));
        assert_eq!(config.logging.filter, "ipo_notifier=info");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        std::fs::write(&path, "[logging]\nfile = \"run.log\"\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.logging.file, Some(PathBuf::from("run.log")));
        assert_eq!(config.logging.filter, "ipo_notifier=info");
        assert_eq!(config.state.path, PathBuf::from(DEFAULT_STATE_FILE));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        std::fs::write(&path, "[state\npath = 3").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn test_endpoints_require_both_values() {
        let both = lookup_from(&[
            (FEED_URL_VAR, "https://feed.test/ipo"),
            (WEBHOOK_URL_VAR, "https://hooks.test/abc\r"),
        ]);
        let endpoints = Endpoints::from_lookup(both).unwrap();
        assert_eq!(endpoints.feed_url, "https://feed.test/ipo");
        assert_eq!(endpoints.webhook_url, "https://hooks.test/abc");

        let no_feed = lookup_from(&[(WEBHOOK_URL_VAR, "https://hooks.test/abc")]);
        assert_eq!(
            Endpoints::from_lookup(no_feed),
            Err(ConfigError::Missing(FEED_URL_VAR))
        );

        let blank_hook = lookup_from(&[(FEED_URL_VAR, "https://feed.test/ipo"), (WEBHOOK_URL_VAR, "  ")]);
        assert_eq!(
            Endpoints::from_lookup(blank_hook),
            Err(ConfigError::Missing(WEBHOOK_URL_VAR))
        );
    }

    #[test]
    fn test_env_file_does_not_override_real_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "\u{feff}# comment\nIPO_NOTIFIER_TEST_A=\"from-file\"\nexport IPO_NOTIFIER_TEST_B=file-b\n",
        )
        .unwrap();
        std::env::set_var("IPO_NOTIFIER_TEST_B", "from-env");

        load_env_file_from(&path);

        assert_eq!(std::env::var("IPO_NOTIFIER_TEST_A").unwrap(), "from-file");
        assert_eq!(std::env::var("IPO_NOTIFIER_TEST_B").unwrap(), "from-env");
    }
}
