//! Inbound host events
//!
//! The engines never poll the host directly for these; the host pushes them
//! through [`Signal`](crate::signal::Signal)s as they happen.

use std::time::Instant;

/// Visibility of the rendering surface (tab / window)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub const fn from_hidden(hidden: bool) -> Self {
        if hidden {
            Visibility::Hidden
        } else {
            Visibility::Visible
        }
    }
}

/// A per-frame callback tick from the host's render loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Presentation timestamp of the frame
    pub timestamp: Instant,
}

impl FrameTick {
    pub const fn new(timestamp: Instant) -> Self {
        Self { timestamp }
    }

    pub fn now() -> Self {
        Self::new(Instant::now())
    }
}
