//! Movement & Physics Integrator
//!
//! The per-frame state machine of the rig: height blend, camera-relative
//! ground movement, jump, gravity and ground resolution, in that order.
//!
//! # Physics Model
//!
//! - Horizontal velocity is not integrated. It is the displacement of the
//!   current frame divided by the frame time, so releasing every movement key
//!   stops the rig instantly.
//! - Vertical velocity is the only state carried between frames. Gravity uses
//!   semi-implicit Euler: velocity first, then position from the new velocity.
//! - The rig rests with its eye at `ground_level + current_height`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fp_controls_engine::player::MovementIntegrator;
//!
//! let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 5.0, 10.0));
//!
//! // Each frame:
//! let outcome = body.step(delta_time, &input.action_state(), look.yaw(), look.pitch());
//! if outcome.jumped {
//!     play_jump_sound();
//! }
//! ```

use glam::{Quat, Vec3};
use tracing::{debug, warn};

use super::crouch::CrouchState;
use super::physics::{GravityModel, GroundLimits, GroundModel};
use super::state::ControllerState;
use crate::config::{
    DEFAULT_SPRINT_MULTIPLIER, MAX_SPRINT_MULTIPLIER, MIN_FRAME_DELTA, MIN_SPRINT_MULTIPLIER,
    PlayerConfig, clamp_finite,
};
use crate::input::ActionState;

/// What happened during one [`MovementIntegrator::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// `false` when the frame was skipped (bad or tiny delta)
    pub advanced: bool,
    /// A jump started this frame
    pub jumped: bool,
    /// The rig touched ground this frame after being airborne
    pub landed: bool,
}

/// Whether `dt` is a usable frame delta.
#[inline]
pub fn is_valid_delta(dt: f32) -> bool {
    dt.is_finite() && dt >= MIN_FRAME_DELTA
}

/// Rig body: position, velocity, ground state and the physics models.
#[derive(Debug)]
pub struct MovementIntegrator {
    position: Vec3,
    velocity: Vec3,
    on_ground: bool,
    ground_level: f32,

    config: PlayerConfig,
    sprint_multiplier: f32,
    crouch: CrouchState,
    limits: GroundLimits,

    gravity: GravityModel,
    ground: GroundModel,
}

impl MovementIntegrator {
    /// Create an airborne body at `position`. `config` is sanitized.
    pub fn new(config: PlayerConfig, position: Vec3) -> Self {
        let config = PlayerConfig::default().sanitized(&config);
        Self {
            position,
            velocity: Vec3::ZERO,
            on_ground: false,
            ground_level: 0.0,
            config,
            sprint_multiplier: DEFAULT_SPRINT_MULTIPLIER,
            crouch: CrouchState::new(config.height),
            limits: GroundLimits::default(),
            gravity: GravityModel::default(),
            ground: GroundModel::default(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    #[inline]
    pub fn ground_level(&self) -> f32 {
        self.ground_level
    }

    /// Blended eye height.
    #[inline]
    pub fn current_height(&self) -> f32 {
        self.crouch.current_height()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn sprint_multiplier(&self) -> f32 {
        self.sprint_multiplier
    }

    pub fn crouch(&self) -> &CrouchState {
        &self.crouch
    }

    pub fn crouch_mut(&mut self) -> &mut CrouchState {
        &mut self.crouch
    }

    pub fn limits(&self) -> &GroundLimits {
        &self.limits
    }

    pub fn limits_mut(&mut self) -> &mut GroundLimits {
        &mut self.limits
    }

    pub fn gravity_model(&self) -> &GravityModel {
        &self.gravity
    }

    pub fn ground_model(&self) -> &GroundModel {
        &self.ground
    }

    pub fn set_gravity_model(&mut self, model: GravityModel) {
        debug!(target: "controls", ?model, "gravity model changed");
        self.gravity = model;
    }

    pub fn set_ground_model(&mut self, model: GroundModel) {
        debug!(target: "controls", ?model, "ground model changed");
        self.ground = model;
    }

    /// Apply a movement config, clamping every field.
    ///
    /// A new standing height snaps the eye height (when standing) and lifts the
    /// rig if it would sit below its resting height.
    pub fn set_config(&mut self, config: PlayerConfig) {
        let config = self.config.sanitized(&config);
        let height_changed = config.height != self.config.height;
        self.config = config;
        if height_changed {
            self.apply_height_change();
        }
    }

    pub fn set_height(&mut self, height: f32) {
        self.set_config(PlayerConfig {
            height,
            ..self.config
        });
    }

    pub fn set_move_speed(&mut self, move_speed: f32) {
        self.set_config(PlayerConfig {
            move_speed,
            ..self.config
        });
    }

    pub fn set_jump_speed(&mut self, jump_speed: f32) {
        self.set_config(PlayerConfig {
            jump_speed,
            ..self.config
        });
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.set_config(PlayerConfig {
            gravity,
            ..self.config
        });
    }

    pub fn set_sprint_multiplier(&mut self, multiplier: f32) {
        if let Some(value) = clamp_finite(
            "sprint_multiplier",
            multiplier,
            MIN_SPRINT_MULTIPLIER,
            MAX_SPRINT_MULTIPLIER,
        ) {
            self.sprint_multiplier = value;
        }
    }

    /// Disabling keeps the crouch request but stands the rig up.
    pub fn set_crouch_enabled(&mut self, enabled: bool) {
        self.crouch.set_enabled(enabled);
    }

    pub fn set_crouching(&mut self, crouching: bool) {
        self.crouch.set_crouching(crouching);
    }

    /// Move the rig, dropping velocity and ground contact.
    pub fn teleport(&mut self, position: Vec3) {
        if !position.is_finite() {
            warn!(target: "controls", ?position, "ignoring non-finite teleport target");
            return;
        }
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.on_ground = false;
    }

    /// Independent snapshot including the look angles.
    pub fn snapshot(&self, yaw: f32, pitch: f32) -> ControllerState {
        ControllerState {
            position: self.position,
            velocity: self.velocity,
            yaw,
            pitch,
            on_ground: self.on_ground,
            current_height: self.crouch.current_height(),
            ground_level: self.ground_level,
        }
    }

    /// Advance the body by `dt` seconds.
    ///
    /// Skipped entirely when `dt` is not finite or below the noise floor.
    pub fn step(&mut self, dt: f32, actions: &ActionState, yaw: f32, pitch: f32) -> StepOutcome {
        if !is_valid_delta(dt) {
            return StepOutcome::default();
        }
        let mut outcome = StepOutcome {
            advanced: true,
            ..Default::default()
        };

        self.blend_height(dt);
        self.move_horizontal(dt, actions, yaw);
        outcome.jumped = self.try_jump(actions);
        self.apply_gravity(dt);
        outcome.landed = self.resolve_ground(dt, yaw, pitch);

        outcome
    }

    fn blend_height(&mut self, dt: f32) {
        let height = self.crouch.blend(dt, self.config.height);
        if self.on_ground {
            self.position.y = self.ground_level + height;
        }
    }

    fn move_horizontal(&mut self, dt: f32, actions: &ActionState, yaw: f32) {
        let rotation = Quat::from_rotation_y(yaw);
        let forward = rotation * Vec3::NEG_Z;
        let right = rotation * Vec3::X;
        let direction =
            forward * actions.forward_axis() as f32 + right * actions.right_axis() as f32;

        let Some(direction) = direction.try_normalize() else {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
            return;
        };

        let sprint = if actions.sprint {
            self.sprint_multiplier
        } else {
            1.0
        };
        let speed = self.config.move_speed * sprint * self.crouch.speed_multiplier();
        let displacement = direction * speed * dt;

        self.position.x += displacement.x;
        self.position.z += displacement.z;
        self.velocity.x = displacement.x / dt;
        self.velocity.z = displacement.z / dt;
    }

    fn try_jump(&mut self, actions: &ActionState) -> bool {
        if !(actions.jump && self.on_ground) {
            return false;
        }
        self.velocity.y = self.config.jump_speed;
        self.on_ground = false;
        debug!(target: "controls", velocity = self.velocity.y, "jump");
        true
    }

    fn apply_gravity(&mut self, dt: f32) {
        let acceleration = self.gravity.acceleration(self.position, self.config.gravity);
        self.velocity += acceleration * dt;
        self.position.y += self.velocity.y * dt;
    }

    /// Returns `true` on a landing.
    fn resolve_ground(&mut self, dt: f32, yaw: f32, pitch: f32) -> bool {
        let snapshot = self.snapshot(yaw, pitch);
        let hit = self.ground.check(&snapshot, dt);
        let level = hit.level();
        let resting_y = level + self.crouch.current_height();
        let hit = self.limits.apply(hit, resting_y, self.position.y);

        let was_on_ground = self.on_ground;
        if hit.grounded {
            self.position.y = resting_y;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
            self.on_ground = true;
            self.ground_level = level;
        } else {
            self.on_ground = false;
        }

        let landed = self.on_ground && !was_on_ground;
        if landed {
            debug!(target: "controls", ground_level = level, "landed");
        }
        landed
    }

    fn apply_height_change(&mut self) {
        if !self.crouch.is_crouching() {
            self.crouch.snap(self.config.height);
        }
        let resting_y = self.ground_level + self.crouch.current_height();
        if self.position.y < resting_y {
            self.position.y = resting_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::physics::{GroundHit, SphericalGravity};

    const EPSILON: f32 = 0.001;
    const FRAME: f32 = 0.016;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn grounded_body() -> MovementIntegrator {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 1.8, 0.0));
        body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        assert!(body.is_on_ground());
        body
    }

    fn forward() -> ActionState {
        ActionState {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_delta_is_noop() {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(1.0, 5.0, 2.0));
        for dt in [0.0, -0.5, 1e-7, f32::NAN, f32::INFINITY] {
            let outcome = body.step(dt, &forward(), 0.0, 0.0);
            assert!(!outcome.advanced);
            assert_eq!(body.position(), Vec3::new(1.0, 5.0, 2.0));
            assert_eq!(body.velocity(), Vec3::ZERO);
        }
    }

    #[test]
    fn test_falls_and_settles() {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 5.0, 10.0));
        let mut landings = 0;
        for _ in 0..200 {
            if body.step(FRAME, &ActionState::default(), 0.0, 0.0).landed {
                landings += 1;
            }
        }
        assert!(body.is_on_ground());
        assert_eq!(body.position().y, 1.8);
        assert_eq!(body.velocity().y, 0.0);
        assert_eq!(landings, 1);

        // Fixed point
        body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        assert_eq!(body.position().y, 1.8);
    }

    #[test]
    fn test_walk_forward_along_neg_z() {
        let mut body = grounded_body();
        body.step(0.1, &forward(), 0.0, 0.0);
        assert!(approx_eq(body.position().z, -0.5));
        assert!(approx_eq(body.position().x, 0.0));
        assert!(approx_eq(body.velocity().z, -5.0));
    }

    #[test]
    fn test_walk_follows_yaw() {
        let mut body = grounded_body();
        // Quarter turn right: forward is +X
        body.step(0.1, &forward(), -std::f32::consts::FRAC_PI_2, 0.0);
        assert!(approx_eq(body.position().x, 0.5));
        assert!(approx_eq(body.position().z, 0.0));
    }

    #[test]
    fn test_pitch_does_not_tilt_movement() {
        let mut body = grounded_body();
        body.step(0.1, &forward(), 0.0, -1.2);
        assert!(approx_eq(body.position().y, 1.8));
        assert!(approx_eq(body.position().z, -0.5));
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut body = grounded_body();
        let actions = ActionState {
            forward: true,
            right: true,
            ..Default::default()
        };
        body.step(0.1, &actions, 0.0, 0.0);
        let horizontal = Vec3::new(body.velocity().x, 0.0, body.velocity().z).length();
        assert!(approx_eq(horizontal, 5.0));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut body = grounded_body();
        let actions = ActionState {
            left: true,
            right: true,
            ..Default::default()
        };
        body.step(0.1, &actions, 0.0, 0.0);
        assert_eq!(body.position().x, 0.0);
        assert_eq!(body.velocity().x, 0.0);
    }

    #[test]
    fn test_release_stops_instantly() {
        let mut body = grounded_body();
        body.step(FRAME, &forward(), 0.0, 0.0);
        body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        assert_eq!(body.velocity().x, 0.0);
        assert_eq!(body.velocity().z, 0.0);
    }

    #[test]
    fn test_sprint_and_crouch_scale_speed() {
        let mut body = grounded_body();
        let sprinting = ActionState {
            forward: true,
            sprint: true,
            ..Default::default()
        };
        body.step(FRAME, &sprinting, 0.0, 0.0);
        assert!(approx_eq(body.velocity().z, -10.0));

        body.set_crouching(true);
        body.step(FRAME, &sprinting, 0.0, 0.0);
        assert!(approx_eq(body.velocity().z, -5.0));
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 5.0, 0.0));
        let jump = ActionState {
            jump: true,
            ..Default::default()
        };
        let outcome = body.step(FRAME, &jump, 0.0, 0.0);
        assert!(!outcome.jumped);
        assert!(body.velocity().y < 0.0);

        let mut body = grounded_body();
        let outcome = body.step(FRAME, &jump, 0.0, 0.0);
        assert!(outcome.jumped);
        assert!(!body.is_on_ground());
        assert!(approx_eq(body.velocity().y, 8.0 - 20.0 * FRAME));

        // Holding jump in the air does not retrigger
        assert!(!body.step(FRAME, &jump, 0.0, 0.0).jumped);
    }

    #[test]
    fn test_grounded_check_keeps_jump_velocity() {
        let mut body = grounded_body();
        body.set_ground_model(GroundModel::custom(|_: &ControllerState, _: f32| {
            GroundHit::flat(true)
        }));
        let jump = ActionState {
            jump: true,
            ..Default::default()
        };
        let outcome = body.step(FRAME, &jump, 0.0, 0.0);

        assert!(outcome.jumped);
        assert!(body.is_on_ground());
        // Only downward velocity is cancelled by the ground
        assert!(body.velocity().y > 0.0);
        assert!(approx_eq(body.velocity().y, 8.0 - 20.0 * FRAME));
        assert!(approx_eq(body.position().y, 1.8));
    }

    #[test]
    fn test_crouch_lowers_grounded_rig() {
        let mut body = grounded_body();
        body.set_crouching(true);
        for _ in 0..100 {
            body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        }
        assert!(body.is_on_ground());
        assert!(approx_eq(body.position().y, 1.08));
        assert!(approx_eq(body.current_height(), 1.08));
    }

    #[test]
    fn test_custom_ground_level() {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 10.0, 0.0));
        body.set_ground_model(GroundModel::custom(|state: &ControllerState, _dt: f32| {
            GroundHit::at_level(state.position.y <= 3.0 + state.current_height, 3.0)
        }));
        for _ in 0..200 {
            body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        }
        assert!(body.is_on_ground());
        assert!(approx_eq(body.position().y, 4.8));
        assert_eq!(body.ground_level(), 3.0);
    }

    #[test]
    fn test_slope_limit_rejects_steep_ground() {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 1.8, 0.0));
        body.set_ground_model(GroundModel::custom(|state: &ControllerState, _dt: f32| {
            GroundHit::flat(state.position.y <= state.current_height).with_normal(Vec3::new(1.0, 0.2, 0.0))
        }));
        body.limits_mut().set_max_slope_angle(Some(0.5));
        body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        assert!(!body.is_on_ground());
        assert!(body.position().y < 1.8);
    }

    #[test]
    fn test_step_limit_rejects_large_snap() {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 0.5, 0.0));
        body.limits_mut().set_max_step_height(Some(0.3));
        body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        assert!(!body.is_on_ground());

        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 1.7, 0.0));
        body.limits_mut().set_max_step_height(Some(0.3));
        body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        assert!(body.is_on_ground());
        assert_eq!(body.position().y, 1.8);
    }

    #[test]
    fn test_custom_gravity_receives_position() {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 50.0, 0.0));
        body.set_gravity_model(GravityModel::custom(|p: Vec3| {
            Vec3::new(0.0, if p.y > 10.0 { -1.0 } else { -20.0 }, 0.0)
        }));
        body.step(0.1, &ActionState::default(), 0.0, 0.0);
        assert!(approx_eq(body.velocity().y, -0.1));
    }

    #[test]
    fn test_spherical_gravity_pulls_down_on_top() {
        let mut body = MovementIntegrator::new(PlayerConfig::default(), Vec3::new(0.0, 20.0, 0.0));
        body.set_gravity_model(GravityModel::Spherical(SphericalGravity::new(
            Vec3::ZERO,
            10.0,
            9.8,
        )));
        body.step(0.1, &ActionState::default(), 0.0, 0.0);
        assert!(approx_eq(body.velocity().y, -0.98));
    }

    #[test]
    fn test_raising_height_lifts_grounded_rig() {
        let mut body = grounded_body();
        body.set_height(2.5);
        assert!(approx_eq(body.position().y, 2.5));
        assert!(approx_eq(body.current_height(), 2.5));

        // Lowering leaves the position for the next frame to settle
        body.set_height(1.5);
        assert!(approx_eq(body.position().y, 2.5));
        body.step(FRAME, &ActionState::default(), 0.0, 0.0);
        assert!(approx_eq(body.position().y, 1.5));
    }

    #[test]
    fn test_setters_clamp() {
        let mut body = grounded_body();
        body.set_sprint_multiplier(0.2);
        assert_eq!(body.sprint_multiplier(), 1.0);
        body.set_sprint_multiplier(50.0);
        assert_eq!(body.sprint_multiplier(), 10.0);
        body.set_move_speed(-3.0);
        assert_eq!(body.config().move_speed, 0.0);
        body.set_height(f32::NAN);
        assert_eq!(body.config().height, 1.8);
    }

    #[test]
    fn test_teleport_resets_motion() {
        let mut body = grounded_body();
        body.teleport(Vec3::new(3.0, 9.0, 3.0));
        assert_eq!(body.position(), Vec3::new(3.0, 9.0, 3.0));
        assert!(!body.is_on_ground());
        assert_eq!(body.velocity(), Vec3::ZERO);

        body.teleport(Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(body.position(), Vec3::new(3.0, 9.0, 3.0));
    }
}
