//! Persisted theme settings
//!
//! Four keys are owned by the theme engine. Every read failure (store
//! unavailable, corrupt file, unparseable value) degrades to "no saved
//! value" with a warning; nothing here returns an error.

use crate::accessibility::AccessibilitySettings;
use crate::preference::ThemePreference;
use crate::presets::ColorPreset;
use vitrine_core::{CapabilityProvider, KeyValueStore};

pub const THEME_KEY: &str = "theme";
pub const HIGH_CONTRAST_KEY: &str = "highContrast";
pub const REDUCE_MOTION_KEY: &str = "reduceMotion";
pub const COLOR_PRESET_KEY: &str = "colorPreset";

/// Everything the engine restores at startup
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersistedTheme {
    pub preference: ThemePreference,
    pub accessibility: AccessibilitySettings,
    pub preset: ColorPreset,
}

impl PersistedTheme {
    /// Read all keys, filling gaps with defaults
    ///
    /// Accessibility flags default to the OS preference only when no value
    /// was ever saved.
    pub fn load(store: &dyn KeyValueStore, caps: &dyn CapabilityProvider) -> Self {
        let preference = read_key(store, THEME_KEY)
            .and_then(|raw| match raw.parse::<ThemePreference>() {
                Ok(pref) => Some(pref),
                Err(err) => {
                    tracing::warn!("ignoring saved theme: {}", err);
                    None
                }
            })
            .unwrap_or_default();

        let high_contrast = read_flag(store, HIGH_CONTRAST_KEY)
            .unwrap_or_else(|| caps.prefers_high_contrast());
        let reduce_motion = read_flag(store, REDUCE_MOTION_KEY)
            .unwrap_or_else(|| caps.prefers_reduced_motion());

        let preset = read_key(store, COLOR_PRESET_KEY)
            .and_then(|raw| match raw.parse::<ColorPreset>() {
                Ok(preset) => Some(preset),
                Err(err) => {
                    tracing::warn!("ignoring saved color preset: {}", err);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            preference,
            accessibility: AccessibilitySettings::new(high_contrast, reduce_motion),
            preset,
        }
    }
}

fn read_key(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, "settings store read failed, using default: {}", err);
            None
        }
    }
}

fn read_flag(store: &dyn KeyValueStore, key: &str) -> Option<bool> {
    let raw = read_key(store, key)?;
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            tracing::warn!(key, value = other, "ignoring non-boolean saved flag");
            None
        }
    }
}

/// Write one key; failures are logged and swallowed
pub fn write_key(store: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(err) = store.set(key, value) {
        tracing::warn!(key, "settings store write failed: {}", err);
    }
}

pub fn write_flag(store: &dyn KeyValueStore, key: &str, value: bool) {
    write_key(store, key, if value { "true" } else { "false" });
}
