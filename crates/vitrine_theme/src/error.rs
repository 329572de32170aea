//! Theme engine errors

use thiserror::Error;

/// Errors surfaced by user-facing theme operations
///
/// Resolution itself never fails; these only reject malformed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    #[error("unknown color preset `{0}` (expected one of: default, ocean, forest, sunset, midnight)")]
    UnknownPreset(String),

    #[error("invalid theme preference `{0}` (expected light, dark, auto or system)")]
    InvalidPreference(String),

    #[error("invalid theme configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ThemeError>;
