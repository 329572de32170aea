//! Particle field options derived from the effects budget
//!
//! Consumers that render a particle backdrop build their options here so the
//! palette, motion and responsive caps stay in step with the theme and the
//! controller.

use vitrine_core::Color;

pub const FPS_LIMIT: u32 = 60;
pub const NORMAL_SPEED: f32 = 1.5;
pub const REDUCED_SPEED: f32 = 0.5;
pub const SMALL_VIEWPORT_SPEED: f32 = 0.8;
pub const LINK_DISTANCE: f32 = 150.0;

/// Viewport-width override
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponsiveRule {
    /// Applies to viewports up to and including this width
    pub max_width: u32,
    pub max_count: u32,
    pub move_speed: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleOptions {
    pub count: u32,
    pub palette: [Color; 3],
    pub link_color: Color,
    pub link_distance: f32,
    /// Opacity and size pulsing
    pub animate: bool,
    /// Hover grab and click push
    pub interactive: bool,
    pub move_speed: f32,
    pub fps_limit: u32,
    /// Narrowest first
    pub responsive: [ResponsiveRule; 2],
}

impl ParticleOptions {
    pub fn derive(budget: u32, is_dark: bool, reduce_motion: bool) -> Self {
        let palette = if is_dark {
            [
                Color::from_hex(0x38BDF8),
                Color::from_hex(0xA78BFA),
                Color::from_hex(0xFB923C),
            ]
        } else {
            [
                Color::from_hex(0x0EA5E9),
                Color::from_hex(0x8B5CF6),
                Color::from_hex(0xF97316),
            ]
        };

        Self {
            count: budget,
            link_color: palette[0],
            palette,
            link_distance: LINK_DISTANCE,
            animate: !reduce_motion,
            interactive: !reduce_motion,
            move_speed: if reduce_motion {
                REDUCED_SPEED
            } else {
                NORMAL_SPEED
            },
            fps_limit: FPS_LIMIT,
            responsive: [
                ResponsiveRule {
                    max_width: 640,
                    max_count: 30,
                    move_speed: Some(SMALL_VIEWPORT_SPEED),
                },
                ResponsiveRule {
                    max_width: 1024,
                    max_count: 60,
                    move_speed: None,
                },
            ],
        }
    }

    fn rule_for(&self, width: u32) -> Option<&ResponsiveRule> {
        self.responsive.iter().find(|rule| width <= rule.max_width)
    }

    pub fn count_for_viewport(&self, width: u32) -> u32 {
        match self.rule_for(width) {
            Some(rule) => self.count.min(rule.max_count),
            None => self.count,
        }
    }

    pub fn speed_for_viewport(&self, width: u32) -> f32 {
        self.rule_for(width)
            .and_then(|rule| rule.move_speed)
            .unwrap_or(self.move_speed)
    }

    /// Palette as CSS hex strings
    pub fn palette_css(&self) -> [String; 3] {
        self.palette.map(|color| color.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_follows_theme() {
        let dark = ParticleOptions::derive(100, true, false);
        assert_eq!(dark.palette_css(), ["#38BDF8", "#A78BFA", "#FB923C"]);
        assert_eq!(dark.link_color.to_css(), "#38BDF8");

        let light = ParticleOptions::derive(100, false, false);
        assert_eq!(light.palette_css(), ["#0EA5E9", "#8B5CF6", "#F97316"]);
        assert_eq!(light.link_color.to_css(), "#0EA5E9");
    }

    #[test]
    fn test_reduce_motion_calms_everything() {
        let options = ParticleOptions::derive(20, false, true);
        assert!(!options.animate);
        assert!(!options.interactive);
        assert_eq!(options.move_speed, REDUCED_SPEED);
        assert_eq!(options.fps_limit, 60);
    }

    #[test]
    fn test_responsive_caps() {
        let options = ParticleOptions::derive(100, false, false);
        assert_eq!(options.count_for_viewport(375), 30);
        assert_eq!(options.count_for_viewport(640), 30);
        assert_eq!(options.count_for_viewport(641), 60);
        assert_eq!(options.count_for_viewport(1024), 60);
        assert_eq!(options.count_for_viewport(1920), 100);

        assert_eq!(options.speed_for_viewport(375), SMALL_VIEWPORT_SPEED);
        assert_eq!(options.speed_for_viewport(800), NORMAL_SPEED);

        let small = ParticleOptions::derive(20, false, false);
        assert_eq!(small.count_for_viewport(375), 20);
    }
}
