//! Configuration for the settings cache

use crate::contract::{Difficulty, SettingsRecord, DEFAULT_LANGUAGE};
use crate::domain::CacheOptions;
use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "SETTINGS_CACHE__";

/// Settings cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Record used when the backend cannot be read
    #[serde(default)]
    pub defaults: DefaultSettings,

    /// Remote gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Drop fetch results that were issued before a newer local write
    #[serde(default = "default_true")]
    pub discard_stale_responses: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultSettings::default(),
            gateway: GatewayConfig::default(),
            discard_stale_responses: true,
        }
    }
}

/// Fallback settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultSettings {
    #[serde(default = "default_language")]
    pub language: String,

    /// Difficulty name, parsed case-insensitively
    #[serde(default = "default_difficulty")]
    pub difficulty: String,

    #[serde(default)]
    pub display: Option<bool>,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            difficulty: default_difficulty(),
            display: None,
        }
    }
}

/// HTTP gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Backend root. Any path on it is kept as a prefix of `settings_path`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Settings endpoint relative to `base_url`; a leading `/` is ignored
    #[serde(default = "default_settings_path")]
    pub settings_path: String,

    /// Request timeout (humantime, e.g. "10s")
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Session cookie sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            settings_path: default_settings_path(),
            timeout: default_timeout(),
            session_cookie: None,
        }
    }
}

impl CacheConfig {
    /// Layer defaults, an optional YAML file and `SETTINGS_CACHE__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(CacheConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: CacheConfig = figment
            .extract()
            .context("failed to load settings cache configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.fallback_record().map(|_| ())
    }

    /// Fallback record described by `defaults`
    pub fn fallback_record(&self) -> Result<SettingsRecord> {
        let language = self.defaults.language.trim();
        if language.is_empty() {
            anyhow::bail!("defaults.language must not be empty");
        }
        let difficulty: Difficulty = self
            .defaults
            .difficulty
            .parse()
            .context("invalid defaults.difficulty")?;
        Ok(SettingsRecord::new(language, difficulty, self.defaults.display))
    }

    pub fn cache_options(&self) -> Result<CacheOptions> {
        Ok(CacheOptions {
            fallback: self.fallback_record()?,
            discard_stale_responses: self.discard_stale_responses,
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_owned()
}

fn default_difficulty() -> String {
    Difficulty::Beginner.as_str().to_owned()
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse("http://localhost:3000").expect("static URL is valid")
}

fn default_settings_path() -> String {
    "/api/user-settings".to_owned()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}
