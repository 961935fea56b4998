use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{StoreKind, DEFAULT_HISTORY_CAP};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_history_dir")]
    pub history_dir: PathBuf,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    pub slack: SlackConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    pub apps: Vec<AppConfig>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_history_dir() -> PathBuf {
    PathBuf::from("history")
}

fn default_history_cap() -> usize {
    DEFAULT_HISTORY_CAP
}

/// Slack delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
    #[serde(default = "default_username")]
    pub username: String,
}

fn default_username() -> String {
    "Review Relay".to_string()
}

/// Translation configuration. `enabled` is the master switch; individual
/// storefronts can still opt out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub target_language: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_language: "en".to_string(),
        }
    }
}

/// One watched application, with its per-store scopes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub android: Option<AndroidConfig>,
    #[serde(default)]
    pub apple_stores: Vec<AppleStoreConfig>,
}

/// Play Store scope for an app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AndroidConfig {
    /// Package name, e.g. com.example.app
    pub package: String,
    /// Reviewer language to keep; matched exactly against the Play
    /// reviewerLanguage field, e.g. "en"
    pub language: String,
    #[serde(default)]
    pub flag: String,
    /// Environment variable holding the Play publisher access token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_true")]
    pub translate: bool,
}

fn default_token_env() -> String {
    "ANDROID_PUBLISHER_TOKEN".to_string()
}

fn default_true() -> bool {
    true
}

/// One Apple storefront scope for an app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppleStoreConfig {
    /// Numeric app id in the Apple catalog
    pub app_id: String,
    /// Short storefront name used in scope keys, e.g. "usa"
    pub name: String,
    pub kind: StoreKind,
    /// X-Apple-Store-Front identifier for the storefront
    pub store_id: u32,
    /// Language the storefront's reviews are written in, e.g. "fr_FR"
    pub language: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default = "default_true")]
    pub translate: bool,
}

impl Config {
    /// Load and validate configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        info!(path = %path.display(), apps = config.apps.len(), "Loaded configuration");

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.slack.webhook_url.is_empty() {
            anyhow::bail!("slack.webhook_url must not be empty");
        }
        if self.apps.is_empty() {
            anyhow::bail!("at least one app must be configured");
        }
        for app in &self.apps {
            if app.android.is_none() && app.apple_stores.is_empty() {
                anyhow::bail!("app '{}' has no stores configured", app.name);
            }
            for store in &app.apple_stores {
                if store.kind == StoreKind::Android {
                    anyhow::bail!(
                        "app '{}': apple store '{}' cannot have kind 'android'",
                        app.name,
                        store.name
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
slack:
  webhook_url: https://hooks.slack.com/services/T000/B000/XXX
translation:
  enabled: true
apps:
  - name: myapp
    android:
      package: com.example.app
      language: en
      flag: "🇺🇸"
    apple_stores:
      - app_id: "123456789"
        name: usa
        kind: ios
        store_id: 143441
        language: en_US
        flag: "🇺🇸"
      - app_id: "123456789"
        name: france
        kind: ios
        store_id: 143442
        language: fr_FR
        flag: "🇫🇷"
        translate: true
"#;

    #[test]
    fn test_parse_sample() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.apps.len(), 1);
        assert_eq!(config.history_cap, 60);
        assert_eq!(config.slack.username, "Review Relay");
        assert!(config.translation.enabled);
        assert_eq!(config.translation.target_language, "en");

        let app = &config.apps[0];
        let android = app.android.as_ref().unwrap();
        assert_eq!(android.package, "com.example.app");
        assert_eq!(android.token_env, "ANDROID_PUBLISHER_TOKEN");
        assert!(android.translate);

        assert_eq!(app.apple_stores.len(), 2);
        assert_eq!(app.apple_stores[1].store_id, 143442);
        assert_eq!(app.apple_stores[1].kind, StoreKind::Ios);
    }

    #[test]
    fn test_missing_webhook_rejected() {
        let yaml = r#"
slack:
  webhook_url: ""
apps:
  - name: myapp
    android:
      package: com.example.app
      language: en_US
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_without_stores_rejected() {
        let yaml = r#"
slack:
  webhook_url: https://hooks.slack.com/services/T000/B000/XXX
apps:
  - name: empty-app
    android: null
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_android_kind_in_apple_list_rejected() {
        let yaml = r#"
slack:
  webhook_url: https://hooks.slack.com/services/T000/B000/XXX
apps:
  - name: myapp
    android: null
    apple_stores:
      - app_id: "1"
        name: usa
        kind: android
        store_id: 143441
        language: en_US
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }
}
