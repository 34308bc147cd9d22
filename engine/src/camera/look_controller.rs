//! Look-Only Controller
//!
//! Mouse-look with pointer lock and no translation or physics. The full
//! [`FirstPersonController`](crate::controller::FirstPersonController) is built
//! on top of this type.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut look = LookController::builder()
//!     .camera(PerspectiveCamera::default())
//!     .input_target(HeadlessPointerLock::granting())
//!     .build()?;
//!
//! look.handle_pointer_down();                       // auto-lock request
//! look.handle_pointer_motion(PointerMotion::new(12.0, -3.0));
//! ```

use tracing::info;

use super::look::LookIntegrator;
use super::sink::CameraSink;
use crate::config::ControllerOptions;
use crate::error::{ControlsError, Result};
use crate::input::{PointerLockBackend, PointerLockState, PointerMotion};

/// Options for mirroring the rig onto another camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Also copy the position (look-only controllers have none to copy)
    pub include_position: bool,
}

impl ApplyOptions {
    pub fn with_position() -> Self {
        Self {
            include_position: true,
        }
    }
}

/// Builder for [`LookController`].
pub struct LookControllerBuilder<C> {
    camera: Option<C>,
    input_target: Option<Box<dyn PointerLockBackend>>,
    options: ControllerOptions,
}

impl<C: CameraSink> Default for LookControllerBuilder<C> {
    fn default() -> Self {
        Self {
            camera: None,
            input_target: None,
            options: ControllerOptions::default(),
        }
    }
}

impl<C: CameraSink> LookControllerBuilder<C> {
    pub fn camera(mut self, camera: C) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Pointer-lock backend of the element or window receiving input.
    pub fn input_target(mut self, backend: impl PointerLockBackend + 'static) -> Self {
        self.input_target = Some(Box::new(backend));
        self
    }

    pub fn boxed_input_target(mut self, backend: Box<dyn PointerLockBackend>) -> Self {
        self.input_target = Some(backend);
        self
    }

    pub fn options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn into_parts(self) -> Result<(C, Box<dyn PointerLockBackend>, ControllerOptions)> {
        let camera = self.camera.ok_or(ControlsError::MissingCamera)?;
        let backend = self.input_target.ok_or(ControlsError::MissingInputTarget)?;
        Ok((camera, backend, self.options))
    }

    pub fn build(self) -> Result<LookController<C>> {
        let (camera, backend, options) = self.into_parts()?;
        let mut controller = LookController::from_parts(camera, backend);
        controller.update_options(&options);
        Ok(controller)
    }
}

/// Mouse-look controller: orientation, field of view and pointer lock.
pub struct LookController<C> {
    look: LookIntegrator,
    pointer: PointerLockState,
    camera: C,
    disposed: bool,
}

impl<C: CameraSink> LookController<C> {
    pub fn builder() -> LookControllerBuilder<C> {
        LookControllerBuilder::default()
    }

    pub(crate) fn from_parts(camera: C, backend: Box<dyn PointerLockBackend>) -> Self {
        let mut controller = Self {
            look: LookIntegrator::new(),
            pointer: PointerLockState::new(backend),
            camera,
            disposed: false,
        };
        controller.sync_camera();
        controller
    }

    /// Apply the look-related fields of `options`.
    pub fn update_options(&mut self, options: &ControllerOptions) {
        if let Some(sensitivity) = options.look_sensitivity {
            self.look.set_sensitivity(sensitivity);
        }
        if let Some(max_pitch) = options.max_pitch {
            self.look.set_max_pitch(max_pitch);
        }
        if let Some(fov) = options.fov {
            self.look.set_fov_degrees(fov);
        }
        if let Some(enabled) = options.pointer_lock_enabled {
            self.pointer.set_enabled(enabled);
        }
        if let Some(auto_lock) = options.auto_lock {
            self.pointer.set_auto_lock(auto_lock);
        }
        self.pointer.poll();
        self.sync_camera();
    }

    pub fn look(&self) -> &LookIntegrator {
        &self.look
    }

    pub fn pointer(&self) -> &PointerLockState {
        &self.pointer
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn yaw(&self) -> f32 {
        self.look.yaw()
    }

    pub fn pitch(&self) -> f32 {
        self.look.pitch()
    }

    /// Feed a raw pointer-motion sample.
    ///
    /// Returns `true` if the sample was eligible and rotated the camera.
    pub fn handle_pointer_motion(&mut self, motion: PointerMotion) -> bool {
        if self.disposed {
            return false;
        }
        self.pointer.poll();
        let Some(delta) = self.pointer.filter_motion(motion) else {
            return false;
        };
        self.look.apply_pointer_delta(delta.x, delta.y);
        self.sync_camera();
        true
    }

    /// Pointer press on the input target: gives it focus and, with auto-lock
    /// on, requests pointer lock.
    pub fn handle_pointer_down(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let requested = self.pointer.handle_pointer_down();
        self.pointer.poll();
        requested
    }

    pub fn handle_focus(&mut self, focused: bool) {
        if !self.disposed {
            self.pointer.set_focus(focused);
        }
    }

    /// Lock-state transition reported by the host (including external exits).
    ///
    /// Returns `true` if the state changed.
    pub fn handle_pointer_lock_change(&mut self, locked: bool) -> bool {
        if self.disposed {
            return false;
        }
        self.pointer.handle_lock_change(locked)
    }

    /// Drain lock transitions reported by the backend.
    pub fn poll_pointer_lock(&mut self) -> Option<bool> {
        if self.disposed {
            return None;
        }
        self.pointer.poll()
    }

    /// Request pointer lock. A backend that grants synchronously is locked on
    /// return; otherwise the grant shows up on a later poll.
    pub fn lock_pointer(&mut self) {
        if !self.disposed {
            self.pointer.request_lock();
            self.pointer.poll();
        }
    }

    pub fn unlock_pointer(&mut self) {
        if !self.disposed {
            self.pointer.exit_lock();
            self.pointer.poll();
        }
    }

    pub fn is_pointer_locked(&self) -> bool {
        self.pointer.is_locked()
    }

    pub fn set_pointer_lock_enabled(&mut self, enabled: bool) {
        if !self.disposed {
            self.pointer.set_enabled(enabled);
            self.pointer.poll();
        }
    }

    pub fn set_auto_lock(&mut self, auto_lock: bool) {
        if !self.disposed {
            self.pointer.set_auto_lock(auto_lock);
        }
    }

    pub fn on_pointer_lock_change(&mut self, callback: impl FnMut(bool) + 'static) {
        self.pointer.on_change(callback);
    }

    pub fn on_look_change(&mut self, callback: impl FnMut(f32, f32) + 'static) {
        self.look.on_look_change(callback);
    }

    pub fn set_look_angles(&mut self, yaw: f32, pitch: Option<f32>) {
        self.look.set_look_angles(yaw, pitch);
        self.sync_camera();
    }

    pub fn set_max_pitch(&mut self, max_pitch: f32) {
        if self.look.set_max_pitch(max_pitch) {
            self.sync_camera();
        }
    }

    pub fn set_look_sensitivity(&mut self, sensitivity: f32) {
        self.look.set_sensitivity(sensitivity);
    }

    pub fn set_fov(&mut self, fov_degrees: f32) {
        self.look.set_fov_degrees(fov_degrees);
        self.sync_camera();
    }

    /// Mirror orientation and field of view onto another camera.
    pub fn apply_to_camera(&self, camera: &mut impl CameraSink) {
        camera.set_orientation(self.look.orientation());
        camera.set_fov_degrees(self.look.fov_degrees());
        camera.mark_matrices_dirty();
    }

    /// Release the pointer, drop callbacks and stop reacting to input.
    /// Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.pointer.shutdown();
        self.look.clear_callbacks();
        self.disposed = true;
        info!(target: "controls", "look controller disposed");
    }

    fn sync_camera(&mut self) {
        self.camera.set_orientation(self.look.orientation());
        self.camera.set_fov_degrees(self.look.fov_degrees());
        self.camera.mark_matrices_dirty();
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::input::HeadlessPointerLock;

    fn controller() -> LookController<PerspectiveCamera> {
        LookController::builder()
            .camera(PerspectiveCamera::default())
            .input_target(HeadlessPointerLock::granting())
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_camera_fails() {
        let result = LookController::<PerspectiveCamera>::builder()
            .input_target(HeadlessPointerLock::granting())
            .build();
        assert!(matches!(result, Err(ControlsError::MissingCamera)));
    }

    #[test]
    fn test_missing_input_target_fails() {
        let result = LookController::builder()
            .camera(PerspectiveCamera::default())
            .build();
        assert!(matches!(result, Err(ControlsError::MissingInputTarget)));
    }

    #[test]
    fn test_motion_ignored_until_locked() {
        let mut look = controller();
        assert!(!look.handle_pointer_motion(PointerMotion::new(50.0, 0.0)));
        assert_eq!(look.yaw(), 0.0);

        look.handle_pointer_down();
        assert!(look.handle_pointer_motion(PointerMotion::new(50.0, 0.0)));
        assert!(look.yaw() < 0.0);
        assert!(look.is_pointer_locked());
    }

    #[test]
    fn test_motion_syncs_camera() {
        let mut look = controller();
        look.lock_pointer();
        look.handle_pointer_motion(PointerMotion::new(0.0, 100.0));
        assert!(look.camera().matrices_dirty());
        assert!(look.camera().forward().y < 0.0);
    }

    #[test]
    fn test_options_applied_at_build() {
        let look = LookController::builder()
            .camera(PerspectiveCamera::default())
            .input_target(HeadlessPointerLock::granting())
            .options(ControllerOptions {
                fov: Some(200.0),
                pointer_lock_enabled: Some(false),
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(look.look().fov_degrees(), 150.0);
        assert_eq!(look.camera().fov_degrees, 150.0);
        assert!(!look.pointer().is_enabled());
    }

    #[test]
    fn test_apply_to_camera_copies_orientation_only() {
        let mut look = controller();
        look.set_look_angles(1.0, Some(0.2));
        let mut other = PerspectiveCamera::default();
        other.position = glam::Vec3::new(4.0, 5.0, 6.0);
        look.apply_to_camera(&mut other);

        assert_eq!(other.position, glam::Vec3::new(4.0, 5.0, 6.0));
        assert!(other.orientation.angle_between(look.look().orientation()) < 1e-4);
        assert_ne!(other.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_dispose_is_terminal_and_idempotent() {
        let mut look = controller();
        look.lock_pointer();
        assert!(look.is_pointer_locked());
        look.dispose();
        look.dispose();

        assert!(look.is_disposed());
        assert!(!look.is_pointer_locked());
        assert!(!look.handle_pointer_motion(PointerMotion::new(10.0, 10.0)));
        look.lock_pointer();
        look.unlock_pointer();
        assert!(!look.is_pointer_locked());
        assert_eq!(look.yaw(), 0.0);
    }
}
