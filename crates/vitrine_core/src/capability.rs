//! Host capability signals
//!
//! Everything the engines want to know about the device and the OS goes
//! through [`CapabilityProvider`], so they can be driven by a fixed provider
//! in tests. All values are best-effort hints; absent values are `None` and
//! callers pick their own conservative defaults.

use std::sync::OnceLock;

/// Environment override for the OS color scheme (`dark` / `light`)
pub const COLOR_SCHEME_ENV: &str = "VITRINE_COLOR_SCHEME";
/// Environment override for the OS reduced-motion preference
pub const REDUCED_MOTION_ENV: &str = "VITRINE_REDUCED_MOTION";
/// Environment override for the OS high-contrast preference
pub const HIGH_CONTRAST_ENV: &str = "VITRINE_HIGH_CONTRAST";

/// User-agent fragments that identify handheld devices
pub const MOBILE_UA_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Source of device and OS preference signals
pub trait CapabilityProvider: Send + Sync {
    /// Handheld device class
    fn is_mobile(&self) -> bool;

    /// Installed memory in GiB, when known
    fn device_memory(&self) -> Option<f32>;

    /// Logical processor count, when known
    fn core_count(&self) -> Option<u32>;

    /// OS dark appearance preference
    fn prefers_dark(&self) -> bool;

    /// OS reduced-motion preference
    fn prefers_reduced_motion(&self) -> bool;

    /// OS increased-contrast preference
    fn prefers_high_contrast(&self) -> bool {
        false
    }
}

/// Whether a user-agent string names a handheld device
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_UA_MARKERS.iter().any(|marker| ua.contains(marker))
}

/// Fixed capability values
///
/// `Default` describes a desktop with unknown hardware and no OS
/// preferences set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticCapabilities {
    pub mobile: bool,
    pub memory_gb: Option<f32>,
    pub cores: Option<u32>,
    pub dark: bool,
    pub reduced_motion: bool,
    pub high_contrast: bool,
}

impl StaticCapabilities {
    /// Desktop with plenty of memory and cores
    pub fn desktop() -> Self {
        Self {
            memory_gb: Some(16.0),
            cores: Some(8),
            ..Default::default()
        }
    }

    /// Derive the device class from a user-agent string
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self {
            mobile: is_mobile_user_agent(user_agent),
            ..Default::default()
        }
    }

    pub fn with_mobile(mut self, mobile: bool) -> Self {
        self.mobile = mobile;
        self
    }

    pub fn with_memory(mut self, memory_gb: Option<f32>) -> Self {
        self.memory_gb = memory_gb;
        self
    }

    pub fn with_cores(mut self, cores: Option<u32>) -> Self {
        self.cores = cores;
        self
    }

    pub fn with_dark(mut self, dark: bool) -> Self {
        self.dark = dark;
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    pub fn with_high_contrast(mut self, high_contrast: bool) -> Self {
        self.high_contrast = high_contrast;
        self
    }
}

impl CapabilityProvider for StaticCapabilities {
    fn is_mobile(&self) -> bool {
        self.mobile
    }

    fn device_memory(&self) -> Option<f32> {
        self.memory_gb
    }

    fn core_count(&self) -> Option<u32> {
        self.cores
    }

    fn prefers_dark(&self) -> bool {
        self.dark
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn prefers_high_contrast(&self) -> bool {
        self.high_contrast
    }
}

/// Best-effort probe of the running host
///
/// Preferences come from the `VITRINE_*` environment overrides first; the
/// color scheme then falls back to a `:dark` `GTK_THEME` suffix. Memory is
/// read from `/proc/meminfo` on Linux and cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCapabilities;

impl SystemCapabilities {
    pub fn new() -> Self {
        Self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "reduce" | "more" => Some(true),
        "0" | "false" | "no" | "off" | "no-preference" => Some(false),
        _ => None,
    }
}

fn parse_meminfo_gb(meminfo: &str) -> Option<f32> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kib: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some((kib / (1024.0 * 1024.0)) as f32)
}

impl CapabilityProvider for SystemCapabilities {
    fn is_mobile(&self) -> bool {
        cfg!(any(target_os = "android", target_os = "ios"))
    }

    fn device_memory(&self) -> Option<f32> {
        static MEMORY: OnceLock<Option<f32>> = OnceLock::new();
        *MEMORY.get_or_init(|| {
            std::fs::read_to_string("/proc/meminfo")
                .ok()
                .and_then(|info| parse_meminfo_gb(&info))
        })
    }

    fn core_count(&self) -> Option<u32> {
        std::thread::available_parallelism()
            .ok()
            .map(|n| n.get() as u32)
    }

    fn prefers_dark(&self) -> bool {
        if let Ok(scheme) = std::env::var(COLOR_SCHEME_ENV) {
            return scheme.trim().eq_ignore_ascii_case("dark");
        }
        std::env::var("GTK_THEME")
            .map(|theme| theme.to_ascii_lowercase().ends_with(":dark"))
            .unwrap_or(false)
    }

    fn prefers_reduced_motion(&self) -> bool {
        env_flag(REDUCED_MOTION_ENV).unwrap_or(false)
    }

    fn prefers_high_contrast(&self) -> bool {
        env_flag(HIGH_CONTRAST_ENV).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_user_agents() {
        let mobile = [
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)",
            "Mozilla/5.0 (Linux; Android 14; Pixel 8)",
            "Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)",
            "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X)",
        ];
        for ua in mobile {
            assert!(is_mobile_user_agent(ua), "{ua}");
        }
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
        ));
    }

    #[test]
    fn test_meminfo_parsing() {
        let info = "MemTotal:        8048576 kB\nMemFree:  100 kB\n";
        let gb = parse_meminfo_gb(info).unwrap();
        assert!((gb - 7.675).abs() < 0.01);
        assert_eq!(parse_meminfo_gb("garbage"), None);
    }

    #[test]
    fn test_static_defaults_are_unknown_desktop() {
        let caps = StaticCapabilities::default();
        assert!(!caps.is_mobile());
        assert_eq!(caps.device_memory(), None);
        assert_eq!(caps.core_count(), None);
        assert!(!caps.prefers_dark());
        assert!(!caps.prefers_reduced_motion());
        assert!(!caps.prefers_high_contrast());
    }
}
