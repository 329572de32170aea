//! Accessibility flags
//!
//! Both flags are independent of the resolved theme. They surface as marker
//! classes on the style scope and the reduce-motion flag feeds the effects
//! controller.

use serde::{Deserialize, Serialize};

/// Marker class applied while high contrast is on
pub const HIGH_CONTRAST_CLASS: &str = "high-contrast";
/// Marker class applied while reduce motion is on
pub const REDUCE_MOTION_CLASS: &str = "reduce-motion";

/// User accessibility preferences
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessibilitySettings {
    pub high_contrast: bool,
    pub reduce_motion: bool,
}

impl AccessibilitySettings {
    pub fn new(high_contrast: bool, reduce_motion: bool) -> Self {
        Self {
            high_contrast,
            reduce_motion,
        }
    }

    /// Marker classes paired with whether each should be present
    pub fn markers(&self) -> [(&'static str, bool); 2] {
        [
            (HIGH_CONTRAST_CLASS, self.high_contrast),
            (REDUCE_MOTION_CLASS, self.reduce_motion),
        ]
    }
}
