//! First-Person Controller
//!
//! Walking, jumping, crouching camera rig. Composes the look-only
//! [`LookController`] (orientation, field of view, pointer lock) with an
//! [`ActionInput`] key tracker and a [`MovementIntegrator`] body.
//!
//! # Entry Points
//!
//! The host drives the rig through two `&mut self` entry points:
//! - [`handle_pointer_motion`](FirstPersonController::handle_pointer_motion) -
//!   any time, from the event loop
//! - [`update`](FirstPersonController::update) - once per rendered frame
//!
//! Both leave the bound camera in sync with the rig.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fp_controls_engine::{FirstPersonController, HeadlessPointerLock, PerspectiveCamera};
//!
//! let mut controller = FirstPersonController::builder()
//!     .camera(PerspectiveCamera::new(16.0 / 9.0))
//!     .input_target(HeadlessPointerLock::granting())
//!     .build()?;
//!
//! controller.on_jump(|| println!("jump!"));
//!
//! // Event loop:
//! controller.handle_pointer_down();
//! controller.handle_key(KeyCode::KeyW, true);
//! controller.handle_pointer_motion(PointerMotion::new(dx, dy));
//!
//! // Each frame:
//! controller.update(delta_time);
//! let view_proj = controller.camera_mut().view_projection();
//! ```

use glam::Vec3;
use tracing::{debug, info};
use winit::keyboard::KeyCode;

use crate::camera::{ApplyOptions, CameraSink, LookController, LookControllerBuilder};
use crate::config::{ControllerOptions, DEFAULT_START_POSITION, PlayerConfig};
use crate::error::Result;
use crate::input::{Action, ActionInput, KeyBindings, PointerLockBackend, PointerMotion};
use crate::player::{ControllerState, DebugInfo, GravityModel, GroundModel, MovementIntegrator};

type JumpCallback = Box<dyn FnMut()>;

/// Builder for [`FirstPersonController`].
///
/// A camera and an input target are required; everything else has defaults.
pub struct FirstPersonControllerBuilder<C> {
    look: LookControllerBuilder<C>,
    options: ControllerOptions,
    bindings: Option<KeyBindings>,
    gravity: Option<GravityModel>,
    ground: Option<GroundModel>,
}

impl<C: CameraSink> Default for FirstPersonControllerBuilder<C> {
    fn default() -> Self {
        Self {
            look: LookControllerBuilder::default(),
            options: ControllerOptions::default(),
            bindings: None,
            gravity: None,
            ground: None,
        }
    }
}

impl<C: CameraSink> FirstPersonControllerBuilder<C> {
    pub fn camera(mut self, camera: C) -> Self {
        self.look = self.look.camera(camera);
        self
    }

    pub fn input_target(mut self, backend: impl PointerLockBackend + 'static) -> Self {
        self.look = self.look.input_target(backend);
        self
    }

    pub fn boxed_input_target(mut self, backend: Box<dyn PointerLockBackend>) -> Self {
        self.look = self.look.boxed_input_target(backend);
        self
    }

    /// Initial options. `start_position` is honored only here.
    pub fn options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = Some(bindings);
        self
    }

    pub fn gravity_model(mut self, model: GravityModel) -> Self {
        self.gravity = Some(model);
        self
    }

    pub fn ground_model(mut self, model: GroundModel) -> Self {
        self.ground = Some(model);
        self
    }

    /// Fails with `MissingCamera` or `MissingInputTarget`.
    pub fn build(self) -> Result<FirstPersonController<C>> {
        let (camera, backend, _) = self.look.into_parts()?;
        let options = self.options;

        let start = options.start_position.unwrap_or(DEFAULT_START_POSITION);
        let mut body =
            MovementIntegrator::new(options.player_config(&PlayerConfig::default()), start);
        if let Some(model) = self.gravity {
            body.set_gravity_model(model);
        }
        if let Some(model) = self.ground {
            body.set_ground_model(model);
        }

        let mut controller = FirstPersonController {
            look: LookController::from_parts(camera, backend),
            input: ActionInput::with_bindings(self.bindings.unwrap_or_default()),
            body,
            on_jump: None,
        };
        controller.update_options(&options);
        info!(target: "controls", position = ?start, "first-person controller ready");
        Ok(controller)
    }
}

/// First-person camera rig.
pub struct FirstPersonController<C> {
    look: LookController<C>,
    input: ActionInput,
    body: MovementIntegrator,
    on_jump: Option<JumpCallback>,
}

impl<C: CameraSink> FirstPersonController<C> {
    pub fn builder() -> FirstPersonControllerBuilder<C> {
        FirstPersonControllerBuilder::default()
    }

    // ------------------------------------------------------------------
    // Per-frame
    // ------------------------------------------------------------------

    /// Advance the rig by `delta_seconds` and sync the camera.
    ///
    /// No-op for non-positive, non-finite or sub-microsecond deltas and after
    /// [`dispose`](Self::dispose).
    pub fn update(&mut self, delta_seconds: f32) {
        if self.is_disposed() || !crate::player::is_valid_delta(delta_seconds) {
            return;
        }
        self.sync_pointer_lock();

        let actions = self.input.action_state();
        let outcome = self.body.step(
            delta_seconds,
            &actions,
            self.look.yaw(),
            self.look.pitch(),
        );
        if outcome.jumped {
            if let Some(callback) = self.on_jump.as_mut() {
                callback();
            }
        }
        self.sync_camera();
    }

    /// Feed a raw pointer-motion sample. Returns `true` if it rotated the view.
    pub fn handle_pointer_motion(&mut self, motion: PointerMotion) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.sync_pointer_lock();
        self.look.handle_pointer_motion(motion)
    }

    /// Physical key press or release. Returns `true` if a bound press was
    /// recorded or a held key was released.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.sync_pointer_lock();
        self.input.handle_key(key, pressed)
    }

    /// Input target gained or lost focus.
    pub fn handle_focus(&mut self, focused: bool) {
        if self.is_disposed() {
            return;
        }
        self.look.handle_focus(focused);
        self.input.set_focus(focused);
    }

    /// Pointer press on the input target. Focuses it and, with auto-lock on,
    /// requests pointer lock. Returns `true` if a lock request was issued.
    pub fn handle_pointer_down(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.input.set_focus(true);
        let requested = self.look.handle_pointer_down();
        self.sync_pointer_lock();
        requested
    }

    /// Lock transition reported by the host, including external exits.
    pub fn handle_pointer_lock_change(&mut self, locked: bool) {
        if self.is_disposed() {
            return;
        }
        self.look.handle_pointer_lock_change(locked);
        self.sync_pointer_lock();
    }

    // ------------------------------------------------------------------
    // Pointer lock
    // ------------------------------------------------------------------

    pub fn lock_pointer(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.look.lock_pointer();
        self.sync_pointer_lock();
    }

    pub fn unlock_pointer(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.look.unlock_pointer();
        self.sync_pointer_lock();
    }

    pub fn is_pointer_locked(&self) -> bool {
        self.look.is_pointer_locked()
    }

    /// Alias of [`lock_pointer`](Self::lock_pointer).
    pub fn request_pointer_lock(&mut self) {
        self.lock_pointer();
    }

    /// Alias of [`unlock_pointer`](Self::unlock_pointer).
    pub fn exit_pointer_lock(&mut self) {
        self.unlock_pointer();
    }

    /// Alias of [`is_pointer_locked`](Self::is_pointer_locked).
    pub fn is_locked(&self) -> bool {
        self.is_pointer_locked()
    }

    pub fn set_pointer_lock_enabled(&mut self, enabled: bool) {
        self.look.set_pointer_lock_enabled(enabled);
        self.sync_pointer_lock();
    }

    pub fn set_auto_lock(&mut self, auto_lock: bool) {
        self.look.set_auto_lock(auto_lock);
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    /// Fired once per jump, on the frame it starts.
    pub fn on_jump(&mut self, callback: impl FnMut() + 'static) {
        if !self.is_disposed() {
            self.on_jump = Some(Box::new(callback));
        }
    }

    /// Fired with the new locked flag on every lock transition.
    pub fn on_pointer_lock_change(&mut self, callback: impl FnMut(bool) + 'static) {
        if !self.is_disposed() {
            self.look.on_pointer_lock_change(callback);
        }
    }

    /// Alias of [`on_pointer_lock_change`](Self::on_pointer_lock_change).
    pub fn on_pointer_lock_toggle(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_pointer_lock_change(callback);
    }

    /// Fired with `(yaw, pitch)` after every look update.
    pub fn on_look_change(&mut self, callback: impl FnMut(f32, f32) + 'static) {
        if !self.is_disposed() {
            self.look.on_look_change(callback);
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Apply every field set in `options`. Out-of-range values are clamped.
    ///
    /// `start_position` is ignored here; use [`teleport`](Self::teleport).
    pub fn update_options(&mut self, options: &ControllerOptions) {
        self.look.update_options(options);
        if options.touches_player_config() {
            self.body.set_config(options.player_config(self.body.config()));
        }
        if let Some(multiplier) = options.sprint_multiplier {
            self.body.set_sprint_multiplier(multiplier);
        }
        if let Some(enabled) = options.crouch_enabled {
            self.body.set_crouch_enabled(enabled);
        }
        if let Some(height) = options.crouch_height {
            self.body.crouch_mut().set_crouch_height(height);
        }
        if let Some(multiplier) = options.crouch_speed_multiplier {
            self.body.crouch_mut().set_speed_multiplier(multiplier);
        }
        if options.max_step_height.is_some() {
            self.body.limits_mut().set_max_step_height(options.max_step_height);
        }
        if options.max_slope_angle.is_some() {
            self.body.limits_mut().set_max_slope_angle(options.max_slope_angle);
        }
        debug!(target: "controls", ?options, "options updated");
        self.sync_pointer_lock();
        self.sync_camera();
    }

    pub fn set_height(&mut self, height: f32) {
        self.body.set_height(height);
        self.sync_camera();
    }

    pub fn set_move_speed(&mut self, move_speed: f32) {
        self.body.set_move_speed(move_speed);
    }

    pub fn set_jump_speed(&mut self, jump_speed: f32) {
        self.body.set_jump_speed(jump_speed);
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.body.set_gravity(gravity);
    }

    pub fn set_sprint_multiplier(&mut self, multiplier: f32) {
        self.body.set_sprint_multiplier(multiplier);
    }

    pub fn set_look_sensitivity(&mut self, sensitivity: f32) {
        self.look.set_look_sensitivity(sensitivity);
    }

    /// Narrowing below the current pitch re-clamps immediately.
    pub fn set_max_pitch(&mut self, max_pitch: f32) {
        self.look.set_max_pitch(max_pitch);
    }

    pub fn set_fov(&mut self, fov_degrees: f32) {
        self.look.set_fov(fov_degrees);
    }

    pub fn set_look_angles(&mut self, yaw: f32, pitch: Option<f32>) {
        self.look.set_look_angles(yaw, pitch);
    }

    /// Replace every binding.
    pub fn set_key_bindings(&mut self, bindings: KeyBindings) {
        self.input = ActionInput::with_bindings(bindings);
        self.input.set_focus(self.look.pointer().has_focus());
        self.input.set_pointer_lock_active(self.look.is_pointer_locked());
    }

    /// Replace the key lists of the named actions.
    pub fn update_key_bindings(&mut self, partial: impl IntoIterator<Item = (Action, Vec<KeyCode>)>) {
        self.input.update_bindings(partial);
    }

    pub fn set_crouch_enabled(&mut self, enabled: bool) {
        self.body.set_crouch_enabled(enabled);
    }

    pub fn set_crouching(&mut self, crouching: bool) {
        self.body.set_crouching(crouching);
    }

    /// Flip crouch. Returns the new effective state.
    pub fn toggle_crouch(&mut self) -> bool {
        self.body.crouch_mut().toggle()
    }

    pub fn set_crouch_height(&mut self, height: f32) {
        self.body.crouch_mut().set_crouch_height(height);
    }

    pub fn set_crouch_speed_multiplier(&mut self, multiplier: f32) {
        self.body.crouch_mut().set_speed_multiplier(multiplier);
    }

    /// `None` removes the step limit.
    pub fn set_max_step_height(&mut self, height: Option<f32>) {
        self.body.limits_mut().set_max_step_height(height);
    }

    /// `None` removes the slope limit.
    pub fn set_max_slope_angle(&mut self, angle: Option<f32>) {
        self.body.limits_mut().set_max_slope_angle(angle);
    }

    pub fn set_gravity_model(&mut self, model: GravityModel) {
        self.body.set_gravity_model(model);
    }

    pub fn set_ground_model(&mut self, model: GroundModel) {
        self.body.set_ground_model(model);
    }

    /// Move the rig, dropping velocity and ground contact.
    pub fn teleport(&mut self, position: Vec3) {
        if self.is_disposed() {
            return;
        }
        self.body.teleport(position);
        self.sync_camera();
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Independent snapshot of the rig.
    pub fn state(&self) -> ControllerState {
        self.body.snapshot(self.look.yaw(), self.look.pitch())
    }

    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo::from_state(&self.state(), self.is_pointer_locked())
    }

    /// Current (blended) eye height.
    pub fn height(&self) -> f32 {
        self.body.current_height()
    }

    pub fn config(&self) -> &PlayerConfig {
        self.body.config()
    }

    pub fn body(&self) -> &MovementIntegrator {
        &self.body
    }

    pub fn look(&self) -> &LookController<C> {
        &self.look
    }

    pub fn input(&self) -> &ActionInput {
        &self.input
    }

    pub fn camera(&self) -> &C {
        self.look.camera()
    }

    pub fn camera_mut(&mut self) -> &mut C {
        self.look.camera_mut()
    }

    pub fn is_disposed(&self) -> bool {
        self.look.is_disposed()
    }

    /// Mirror orientation and field of view (and optionally position) onto
    /// another camera.
    pub fn apply_to_camera(&self, camera: &mut impl CameraSink, options: ApplyOptions) {
        self.look.apply_to_camera(camera);
        if options.include_position {
            camera.set_position(self.body.position());
            camera.mark_matrices_dirty();
        }
    }

    /// Release the pointer, drop callbacks and clear held keys. Later calls to
    /// the per-frame and pointer-lock entry points are no-ops. Idempotent.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.look.dispose();
        self.input.reset();
        self.input.set_pointer_lock_active(false);
        self.input.set_focus(false);
        self.on_jump = None;
        info!(target: "controls", "first-person controller disposed");
    }

    /// Pick up lock transitions and gate key input on them.
    ///
    /// Losing the lock releases every held key.
    fn sync_pointer_lock(&mut self) {
        self.look.poll_pointer_lock();
        let locked = self.look.is_pointer_locked();
        if locked == self.input.is_pointer_lock_active() {
            return;
        }
        self.input.set_pointer_lock_active(locked);
        if !locked {
            self.input.reset();
        }
    }

    fn sync_camera(&mut self) {
        let position = self.body.position();
        let orientation = self.look.look().orientation();
        let fov = self.look.look().fov_degrees();
        let camera = self.look.camera_mut();
        camera.set_position(position);
        camera.set_orientation(orientation);
        camera.set_fov_degrees(fov);
        camera.mark_matrices_dirty();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::error::ControlsError;
    use crate::input::HeadlessPointerLock;

    fn controller() -> FirstPersonController<PerspectiveCamera> {
        FirstPersonController::builder()
            .camera(PerspectiveCamera::default())
            .input_target(HeadlessPointerLock::granting())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_camera_and_target() {
        let missing_camera = FirstPersonController::<PerspectiveCamera>::builder()
            .input_target(HeadlessPointerLock::granting())
            .build();
        assert!(matches!(missing_camera, Err(ControlsError::MissingCamera)));

        let missing_target = FirstPersonController::builder()
            .camera(PerspectiveCamera::default())
            .build();
        assert!(matches!(missing_target, Err(ControlsError::MissingInputTarget)));
    }

    #[test]
    fn test_starts_at_default_position() {
        let controller = controller();
        assert_eq!(controller.state().position, DEFAULT_START_POSITION);
        assert_eq!(controller.camera().position, DEFAULT_START_POSITION);
        assert!(!controller.state().on_ground);
    }

    #[test]
    fn test_keys_need_focus_or_lock() {
        let mut controller = controller();
        assert!(!controller.handle_key(KeyCode::KeyW, true));

        controller.lock_pointer();
        assert!(controller.is_pointer_locked());
        assert!(controller.handle_key(KeyCode::KeyW, true));
        assert!(controller.input().is_action_pressed(Action::Forward));
    }

    #[test]
    fn test_lock_loss_releases_keys() {
        let mut controller = controller();
        controller.lock_pointer();
        controller.handle_key(KeyCode::KeyW, true);

        // Escape pressed, the host reports the exit
        controller.handle_pointer_lock_change(false);
        assert!(!controller.is_pointer_locked());
        assert!(!controller.input().is_action_pressed(Action::Forward));
    }

    #[test]
    fn test_jump_callback() {
        let jumps = Rc::new(Cell::new(0));
        let counter = jumps.clone();
        let mut controller = controller();
        controller.on_jump(move || counter.set(counter.get() + 1));
        controller.teleport(Vec3::new(0.0, 1.8, 0.0));
        controller.update(0.016);
        assert!(controller.state().on_ground);

        controller.lock_pointer();
        controller.handle_key(KeyCode::Space, true);
        controller.update(0.016);
        controller.update(0.016);
        assert_eq!(jumps.get(), 1);
    }

    #[test]
    fn test_update_options_applies_everything() {
        let mut controller = controller();
        controller.update_options(&ControllerOptions {
            move_speed: Some(7.0),
            sprint_multiplier: Some(0.5),
            fov: Some(90.0),
            max_step_height: Some(0.4),
            ..Default::default()
        });
        assert_eq!(controller.config().move_speed, 7.0);
        assert_eq!(controller.body().sprint_multiplier(), 1.0);
        assert_eq!(controller.camera().fov_degrees, 90.0);
        assert_eq!(controller.body().limits().max_step_height, Some(0.4));
    }

    #[test]
    fn test_set_key_bindings_keeps_lock_gate() {
        let mut controller = controller();
        controller.lock_pointer();
        let mut bindings = KeyBindings::empty();
        bindings.bind(Action::Forward, vec![KeyCode::KeyI]);
        controller.set_key_bindings(bindings);

        assert!(controller.handle_key(KeyCode::KeyI, true));
        assert!(!controller.handle_key(KeyCode::KeyW, true));
    }

    #[test]
    fn test_debug_info_reports_lock() {
        let mut controller = controller();
        assert!(!controller.debug_info().pointer_locked);
        controller.lock_pointer();
        assert!(controller.debug_info().pointer_locked);
    }
}
