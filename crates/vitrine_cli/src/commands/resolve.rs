//! `vitrine resolve`

use crate::config::VitrineConfig;
use anyhow::Result;
use vitrine_core::{Clock, SystemClock};
use vitrine_theme::{resolve_in, ColorScheme, ThemePreference};

pub fn run(
    config: &VitrineConfig,
    preference: &str,
    os_dark: bool,
    hour: Option<u32>,
) -> Result<ColorScheme> {
    let preference: ThemePreference = preference.parse()?;
    let hour = match hour {
        Some(hour) if hour > 23 => anyhow::bail!("hour must be within 0..=23 (got {hour})"),
        Some(hour) => hour,
        None => SystemClock.local_hour(),
    };

    let scheme = resolve_in(
        preference,
        os_dark,
        hour,
        config.theme.day_start_hour,
        config.theme.night_start_hour,
    );
    tracing::debug!(%preference, os_dark, hour, %scheme, "resolved");
    Ok(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_configured_window() {
        let mut config = VitrineConfig::default();
        assert_eq!(run(&config, "auto", false, Some(6)).unwrap(), ColorScheme::Light);

        config.theme.day_start_hour = 8;
        assert_eq!(run(&config, "auto", false, Some(6)).unwrap(), ColorScheme::Dark);
        assert_eq!(run(&config, "system", true, Some(12)).unwrap(), ColorScheme::Dark);
    }

    #[test]
    fn test_resolve_rejects_bad_input() {
        let config = VitrineConfig::default();
        assert!(run(&config, "sepia", false, Some(12)).is_err());
        assert!(run(&config, "auto", false, Some(24)).is_err());
    }
}
