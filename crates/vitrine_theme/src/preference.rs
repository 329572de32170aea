//! Theme preference and resolution
//!
//! The user picks a [`ThemePreference`]; what is displayed is a
//! [`ColorScheme`] computed by [`resolve`] from that preference, the OS dark
//! signal and the local hour. The resolved scheme is never stored as ground
//! truth.

use crate::error::ThemeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First hour (inclusive) of daytime for [`ThemePreference::Auto`]
pub const DAY_START_HOUR: u32 = 6;
/// First hour (inclusive) of nighttime for [`ThemePreference::Auto`]
pub const NIGHT_START_HOUR: u32 = 18;

/// The user's stored theme choice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    /// Light during the day, dark at night
    Auto,
    /// Follow the OS appearance
    #[default]
    System,
}

impl ThemePreference {
    /// Stable id used for persistence
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
            Self::System => "system",
        }
    }

    /// All preferences, in menu order
    pub fn all() -> &'static [ThemePreference] {
        const ALL: [ThemePreference; 4] = [
            ThemePreference::Light,
            ThemePreference::Dark,
            ThemePreference::Auto,
            ThemePreference::System,
        ];
        &ALL
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "auto" => Ok(Self::Auto),
            "system" => Ok(Self::System),
            _ => Err(ThemeError::InvalidPreference(s.to_string())),
        }
    }
}

/// The concrete appearance on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheme for a local hour with the day window `[day_start, night_start)`
fn scheme_for_hour(hour: u32, day_start: u32, night_start: u32) -> ColorScheme {
    if (day_start..night_start).contains(&hour) {
        ColorScheme::Light
    } else {
        ColorScheme::Dark
    }
}

/// Resolve a preference with the default day window
///
/// Pure: identical inputs always give the identical scheme.
pub fn resolve(preference: ThemePreference, os_dark: bool, hour: u32) -> ColorScheme {
    resolve_in(preference, os_dark, hour, DAY_START_HOUR, NIGHT_START_HOUR)
}

/// Resolve a preference with a custom day window
pub fn resolve_in(
    preference: ThemePreference,
    os_dark: bool,
    hour: u32,
    day_start: u32,
    night_start: u32,
) -> ColorScheme {
    match preference {
        ThemePreference::Light => ColorScheme::Light,
        ThemePreference::Dark => ColorScheme::Dark,
        ThemePreference::Auto => scheme_for_hour(hour, day_start, night_start),
        ThemePreference::System => ColorScheme::from_dark(os_dark),
    }
}
