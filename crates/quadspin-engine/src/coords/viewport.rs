/// Drawable size in physical pixels.
///
/// The display driver hands this to `update` so the projection can follow the
/// window shape.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns `width / height`, or `None` for a degenerate viewport.
    #[inline]
    pub fn aspect(self) -> Option<f32> {
        self.is_valid().then(|| self.width / self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_portrait_phone() {
        let aspect = Viewport::new(750.0, 1334.0).aspect().unwrap();
        assert!((aspect - 0.5622).abs() < 1e-3);
        assert_eq!(aspect, 750.0 / 1334.0);
    }

    #[test]
    fn aspect_rejects_zero_height() {
        assert!(Viewport::new(640.0, 0.0).aspect().is_none());
    }

    #[test]
    fn aspect_rejects_non_finite() {
        assert!(Viewport::new(f32::NAN, 10.0).aspect().is_none());
        assert!(Viewport::new(f32::INFINITY, 10.0).aspect().is_none());
    }
}
