//! Vitrine configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vitrine_core::FileStore;
use vitrine_effects::EffectsConfig;
use vitrine_theme::ThemeConfig;

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "vitrine.toml";

/// Top-level Vitrine configuration (vitrine.toml)
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct VitrineConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Settings store location
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON settings file; the platform config directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogConfig {
    /// `tracing_subscriber` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl VitrineConfig {
    /// Load configuration from a file or a directory containing vitrine.toml
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No config found at {}. Run `vitrine init` to create one.",
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load {}", config_path.display()))
    }

    /// Explicit path, else ./vitrine.toml when present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let local = Path::new(CONFIG_FILE);
                if local.is_file() {
                    Self::load_from(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse and validate
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: VitrineConfig = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.theme.validate().context("Invalid [theme] section")?;
        self.effects
            .validate()
            .context("Invalid [effects] section")?;
        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Open the settings store: `override_path`, then `[store].path`, then
    /// the platform default
    pub fn open_store(&self, override_path: Option<&Path>) -> Result<FileStore> {
        match override_path.or(self.store.path.as_deref()) {
            Some(path) => Ok(FileStore::new(path)),
            None => FileStore::at_default_location()
                .context("Failed to locate the settings directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = VitrineConfig::from_toml("").unwrap();
        assert_eq!(config, VitrineConfig::default());
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.theme.transition_ms, 300);
        assert_eq!(config.effects.full_budget, 100);
    }

    #[test]
    fn test_sections_override_independently() {
        let config = VitrineConfig::from_toml(
            r#"
[theme]
day_start_hour = 7

[effects]
floor = 10
hidden_floor = 5

[store]
path = "/tmp/vitrine/settings.json"

[log]
filter = "vitrine=debug"
"#,
        )
        .unwrap();

        assert_eq!(config.theme.day_start_hour, 7);
        assert_eq!(config.theme.night_start_hour, 18);
        assert_eq!(config.effects.floor, 10);
        assert_eq!(config.effects.hidden_floor, 5);
        assert_eq!(
            config.store.path.as_deref(),
            Some(Path::new("/tmp/vitrine/settings.json"))
        );
        assert_eq!(config.log.filter, "vitrine=debug");
    }

    #[test]
    fn test_invalid_sections_are_rejected() {
        assert!(VitrineConfig::from_toml("[effects]\nstep = 0").is_err());
        assert!(VitrineConfig::from_toml("[theme]\nday_start_hour = 20").is_err());
        assert!(VitrineConfig::from_toml("[theme\n").is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VitrineConfig::default();
        config.effects.full_budget = 80;
        fs::write(dir.path().join(CONFIG_FILE), config.to_toml().unwrap()).unwrap();

        let loaded = VitrineConfig::load_from(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = VitrineConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("vitrine init"));
    }

    #[test]
    fn test_store_override_wins() {
        let config = VitrineConfig {
            store: StoreConfig {
                path: Some(PathBuf::from("/from/config.json")),
            },
            ..Default::default()
        };
        let store = config.open_store(Some(Path::new("/from/flag.json"))).unwrap();
        assert_eq!(store.path(), Path::new("/from/flag.json"));

        let store = config.open_store(None).unwrap();
        assert_eq!(store.path(), Path::new("/from/config.json"));
    }
}
