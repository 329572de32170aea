//! Color values pushed into the style scope

/// An opaque RGB color with `0.0..=1.0` channels
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    /// Channels as 8-bit values (`r, g, b`)
    pub fn to_rgb8(&self) -> [u8; 3] {
        fn channel(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    /// `#RRGGBB`
    pub fn to_css(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip_is_exact() {
        for hex in [0x0EA5E9, 0x1E293B, 0xFFFFFF, 0x000000, 0xFCD34D] {
            let css = Color::from_hex(hex).to_css();
            assert_eq!(css, format!("#{:06X}", hex));
        }
    }

    #[test]
    fn test_out_of_range_channels_clamp() {
        assert_eq!(Color::rgb(1.5, -0.2, 0.5).to_rgb8(), [255, 0, 128]);
    }
}
