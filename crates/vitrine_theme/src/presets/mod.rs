//! Built-in color presets
//!
//! A preset overrides the three brand colors through CSS custom properties.
//! It never changes the resolved light/dark theme.

use crate::error::ThemeError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use vitrine_core::Color;

/// CSS variable carrying the primary brand color
pub const PRIMARY_VAR: &str = "--color-primary";
/// CSS variable carrying the secondary brand color
pub const SECONDARY_VAR: &str = "--color-secondary";
/// CSS variable carrying the accent color
pub const ACCENT_VAR: &str = "--color-accent";

/// Built-in preset catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPreset {
    /// Sky / violet / orange.
    #[default]
    Default,
    Ocean,
    Forest,
    Sunset,
    Midnight,
}

/// The three colors a preset assigns
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresetPalette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
}

impl PresetPalette {
    fn from_hex(primary: u32, secondary: u32, accent: u32) -> Self {
        Self {
            primary: Color::from_hex(primary),
            secondary: Color::from_hex(secondary),
            accent: Color::from_hex(accent),
        }
    }

    /// `(variable, css value)` pairs in application order
    pub fn css_variables(&self) -> [(&'static str, String); 3] {
        [
            (PRIMARY_VAR, self.primary.to_css()),
            (SECONDARY_VAR, self.secondary.to_css()),
            (ACCENT_VAR, self.accent.to_css()),
        ]
    }
}

impl ColorPreset {
    /// Stable preset id for persistence.
    pub fn id(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::Sunset => "sunset",
            Self::Midnight => "midnight",
        }
    }

    /// User-facing display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Ocean => "Ocean",
            Self::Forest => "Forest",
            Self::Sunset => "Sunset",
            Self::Midnight => "Midnight",
        }
    }

    /// Full preset list.
    pub fn all() -> &'static [ColorPreset] {
        const PRESETS: [ColorPreset; 5] = [
            ColorPreset::Default,
            ColorPreset::Ocean,
            ColorPreset::Forest,
            ColorPreset::Sunset,
            ColorPreset::Midnight,
        ];
        &PRESETS
    }

    /// Look a preset up by id (case-insensitive).
    pub fn from_id(id: &str) -> Option<ColorPreset> {
        let id = id.trim();
        Self::all()
            .iter()
            .copied()
            .find(|preset| preset.id().eq_ignore_ascii_case(id))
    }

    pub fn palette(self) -> PresetPalette {
        match self {
            Self::Default => PresetPalette::from_hex(0x0EA5E9, 0x8B5CF6, 0xF97316),
            Self::Ocean => PresetPalette::from_hex(0x0891B2, 0x06B6D4, 0xF59E0B),
            Self::Forest => PresetPalette::from_hex(0x059669, 0x10B981, 0xF97316),
            Self::Sunset => PresetPalette::from_hex(0xDC2626, 0xF97316, 0xFCD34D),
            Self::Midnight => PresetPalette::from_hex(0x6366F1, 0x8B5CF6, 0xEC4899),
        }
    }
}

impl Display for ColorPreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ColorPreset {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| ThemeError::UnknownPreset(s.to_string()))
    }
}
