//! Theme engine configuration
//!
//! Deserialized from the `[theme]` table of `vitrine.toml`; every field is
//! optional.

use crate::error::{Result, ThemeError};
use crate::preference::{DAY_START_HOUR, NIGHT_START_HOUR};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeConfig {
    /// How long the transition marker stays on after a theme change
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,
    /// Re-evaluation period while the preference is `auto`
    #[serde(default = "default_auto_check_interval_ms")]
    pub auto_check_interval_ms: u64,
    /// First daytime hour for `auto`
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,
    /// First nighttime hour for `auto`
    #[serde(default = "default_night_start_hour")]
    pub night_start_hour: u32,
    /// Poll period of the OS scheme watcher
    #[serde(default = "default_watcher_poll_ms")]
    pub watcher_poll_ms: u64,
}

fn default_transition_ms() -> u64 {
    300
}

fn default_auto_check_interval_ms() -> u64 {
    60_000
}

fn default_day_start_hour() -> u32 {
    DAY_START_HOUR
}

fn default_night_start_hour() -> u32 {
    NIGHT_START_HOUR
}

fn default_watcher_poll_ms() -> u64 {
    2_000
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            transition_ms: default_transition_ms(),
            auto_check_interval_ms: default_auto_check_interval_ms(),
            day_start_hour: default_day_start_hour(),
            night_start_hour: default_night_start_hour(),
            watcher_poll_ms: default_watcher_poll_ms(),
        }
    }
}

impl ThemeConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn auto_check_interval(&self) -> Duration {
        Duration::from_millis(self.auto_check_interval_ms)
    }

    pub fn watcher_poll(&self) -> Duration {
        Duration::from_millis(self.watcher_poll_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.day_start_hour > 24 || self.night_start_hour > 24 {
            return Err(ThemeError::InvalidConfig(format!(
                "day/night hours must be within 0..=24 (got {} and {})",
                self.day_start_hour, self.night_start_hour
            )));
        }
        if self.day_start_hour >= self.night_start_hour {
            return Err(ThemeError::InvalidConfig(format!(
                "day_start_hour ({}) must be before night_start_hour ({})",
                self.day_start_hour, self.night_start_hour
            )));
        }
        if self.auto_check_interval_ms == 0 || self.watcher_poll_ms == 0 {
            return Err(ThemeError::InvalidConfig(
                "polling intervals must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
