//! Camera Sink
//!
//! The render-facing end of the controller. Anything that can take a
//! position, an orientation and a field of view can be driven by the rig.
//!
//! [`PerspectiveCamera`] is a ready-made sink that caches its view and
//! projection matrices and rebuilds them only after a write marked them stale.

use glam::{Mat4, Quat, Vec3};

/// Receives the rig's final pose every frame.
pub trait CameraSink {
    fn set_position(&mut self, position: Vec3);

    /// Orientation equivalent to Euler `(pitch, yaw, 0)` applied Y, then X, then Z.
    fn set_orientation(&mut self, orientation: Quat);

    /// Vertical field of view in degrees.
    fn set_fov_degrees(&mut self, fov_degrees: f32);

    /// Flag derived matrices as stale after a write.
    fn mark_matrices_dirty(&mut self);
}

/// Perspective camera with cached matrices.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    matrices_dirty: bool,
    view: Mat4,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            fov_degrees: crate::config::DEFAULT_FOV_DEGREES,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            matrices_dirty: true,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            aspect,
            ..Default::default()
        };
        camera.mark_matrices_dirty();
        camera.update_matrices();
        camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
            self.matrices_dirty = true;
        }
    }

    /// Whether a write happened since the last `update_matrices`.
    pub fn matrices_dirty(&self) -> bool {
        self.matrices_dirty
    }

    /// Rebuild view and projection if stale. Returns `true` if rebuilt.
    pub fn update_matrices(&mut self) -> bool {
        if !self.matrices_dirty {
            return false;
        }
        let world = Mat4::from_rotation_translation(self.orientation, self.position);
        self.view = world.inverse();
        self.projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
        self.matrices_dirty = false;
        true
    }

    /// Cached view matrix (valid after `update_matrices`).
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Cached projection matrix (valid after `update_matrices`).
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&mut self) -> Mat4 {
        self.update_matrices();
        self.projection * self.view
    }

    /// Direction the camera looks along (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}

impl CameraSink for PerspectiveCamera {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov_degrees = fov_degrees;
    }

    fn mark_matrices_dirty(&mut self) {
        self.matrices_dirty = true;
    }
}
