//! Transform effect.
//!
//! Holds the projection and model-view matrices of one draw and hands them to
//! the active pipeline. Matrices use the GL clip-space convention; backends
//! convert if their API differs.

use glam::{Mat4, Vec3};

use crate::gfx::{GraphicsApi, GraphicsError};

/// Perspective parameters. Angles in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Perspective {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            fov_y_degrees: 65.0,
            near: 4.0,
            far: 10.0,
        }
    }
}

impl Perspective {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformEffect {
    pub projection: Mat4,
    pub model_view: Mat4,
}

impl Default for TransformEffect {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
        }
    }
}

impl TransformEffect {
    /// Model-view for an object pushed `translation` away from the eye and
    /// spun `angle_degrees` around its Z axis.
    pub fn spin_z(translation: Vec3, angle_degrees: f32) -> Mat4 {
        Mat4::from_translation(translation) * Mat4::from_rotation_z(angle_degrees.to_radians())
    }

    /// Combined model-view-projection.
    #[inline]
    pub fn mvp(&self) -> Mat4 {
        self.projection * self.model_view
    }

    /// Makes both matrices the active transforms for subsequent draws.
    pub fn apply<G: GraphicsApi + ?Sized>(&self, api: &mut G) -> Result<(), GraphicsError> {
        api.set_transforms(&self.projection, &self.model_view)
    }
}
