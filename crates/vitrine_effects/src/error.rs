//! Effects controller errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectsError {
    #[error("invalid effects configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EffectsError>;
