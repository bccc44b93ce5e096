use glam::Vec3;

use crate::coords::ColorRgba;
use crate::effect::Perspective;

/// Scene constants of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Framebuffer clear color.
    pub clear_color: ColorRgba,

    /// Spin speed around Z.
    pub degrees_per_second: f32,

    /// Where the quad sits relative to the eye.
    pub translation: Vec3,

    pub perspective: Perspective,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clear_color: ColorRgba::LIGHT_GRAY,
            degrees_per_second: 90.0,
            translation: Vec3::new(0.0, 0.0, -6.0),
            perspective: Perspective::default(),
        }
    }
}
