//! Controller Configuration
//!
//! Tuning constants and the serializable option surface consumed by the
//! movement integrator and the look integrator.
//!
//! # Clamping policy
//!
//! Every setter in this crate clamps its argument into the valid range listed
//! next to the constants below. Non-finite values are ignored. Nothing in the
//! configuration path returns an error except parsing options from JSON.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fp_controls_engine::config::ControllerOptions;
//!
//! let options = ControllerOptions::from_json_str(r#"{ "move_speed": 7.5, "fov": 90 }"#)?;
//! controller.update_options(&options);
//! ```

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use tracing::{debug, warn};

use crate::error::Result;

/// Standing eye height in meters
pub const DEFAULT_HEIGHT: f32 = 1.8;

/// Walk speed in meters per second
pub const DEFAULT_MOVE_SPEED: f32 = 5.0;

/// Initial upward velocity of a jump in meters per second
pub const DEFAULT_JUMP_SPEED: f32 = 8.0;

/// Gravity magnitude in meters per second squared
pub const DEFAULT_GRAVITY: f32 = 20.0;

/// Sprint speed multiplier (applied to move speed)
pub const DEFAULT_SPRINT_MULTIPLIER: f32 = 2.0;

/// Mouse sensitivity in radians per pixel
pub const DEFAULT_LOOK_SENSITIVITY: f32 = 0.002;

/// Pitch bound: 89 degrees in radians
pub const DEFAULT_MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Vertical field of view in degrees
pub const DEFAULT_FOV_DEGREES: f32 = 75.0;

/// Crouch height as a fraction of the standing height
pub const CROUCH_HEIGHT_RATIO: f32 = 0.6;

/// Speed multiplier while crouching
pub const DEFAULT_CROUCH_SPEED_MULTIPLIER: f32 = 0.5;

/// Starting position of a freshly built rig
pub const DEFAULT_START_POSITION: Vec3 = Vec3::new(0.0, 5.0, 10.0);

/// Rate constant of the exponential eye-height blend (per second)
pub const HEIGHT_BLEND_RATE: f32 = 10.0;

/// Distance under which the blended height snaps onto its target
pub const HEIGHT_SNAP_EPSILON: f32 = 0.001;

/// Frame deltas below this are treated as clock noise and skipped
pub const MIN_FRAME_DELTA: f32 = 1e-6;

pub const MIN_LOOK_SENSITIVITY: f32 = 0.0001;
pub const MAX_LOOK_SENSITIVITY: f32 = 0.1;
pub const MIN_SPRINT_MULTIPLIER: f32 = 1.0;
pub const MAX_SPRINT_MULTIPLIER: f32 = 10.0;
pub const MIN_FOV_DEGREES: f32 = 10.0;
pub const MAX_FOV_DEGREES: f32 = 150.0;
pub const MIN_MAX_PITCH: f32 = 0.1;
pub const MAX_MAX_PITCH: f32 = FRAC_PI_2 - 0.01;
pub const MIN_HEIGHT: f32 = 0.1;
pub const MIN_CROUCH_HEIGHT: f32 = 0.3;
pub const MIN_CROUCH_SPEED_MULTIPLIER: f32 = 0.05;
pub const MAX_CROUCH_SPEED_MULTIPLIER: f32 = 1.0;
pub const MAX_SLOPE_LIMIT: f32 = FRAC_PI_2;

const_assert!(MIN_LOOK_SENSITIVITY < MAX_LOOK_SENSITIVITY);
const_assert!(MIN_FOV_DEGREES < DEFAULT_FOV_DEGREES && DEFAULT_FOV_DEGREES < MAX_FOV_DEGREES);
const_assert!(MIN_MAX_PITCH < DEFAULT_MAX_PITCH && DEFAULT_MAX_PITCH < MAX_MAX_PITCH);
const_assert!(MIN_CROUCH_HEIGHT < DEFAULT_HEIGHT * CROUCH_HEIGHT_RATIO);

/// Clamp `value` into `[min, max]`, returning `None` for NaN or infinities.
pub(crate) fn clamp_finite(name: &'static str, value: f32, min: f32, max: f32) -> Option<f32> {
    if !value.is_finite() {
        warn!(target: "controls", option = name, value, "ignoring non-finite value");
        return None;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        debug!(target: "controls", option = name, value, clamped, "value clamped");
    }
    Some(clamped)
}

/// Movement tuning for the rig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Resting eye height in meters
    pub height: f32,
    /// Walk speed in m/s
    pub move_speed: f32,
    /// Initial vertical velocity of a jump in m/s
    pub jump_speed: f32,
    /// Gravity magnitude in m/s^2, used only by the constant gravity model
    pub gravity: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            move_speed: DEFAULT_MOVE_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
            gravity: DEFAULT_GRAVITY,
        }
    }
}

impl PlayerConfig {
    /// Return a copy with every field clamped into its valid range.
    ///
    /// Non-finite fields keep the value from `self`.
    pub fn sanitized(&self, patch: &PlayerConfig) -> PlayerConfig {
        PlayerConfig {
            height: clamp_finite("height", patch.height, MIN_HEIGHT, f32::MAX).unwrap_or(self.height),
            move_speed: clamp_finite("move_speed", patch.move_speed, 0.0, f32::MAX)
                .unwrap_or(self.move_speed),
            jump_speed: clamp_finite("jump_speed", patch.jump_speed, 0.0, f32::MAX)
                .unwrap_or(self.jump_speed),
            gravity: clamp_finite("gravity", patch.gravity, 0.0, f32::MAX).unwrap_or(self.gravity),
        }
    }
}

/// Partial option set applied by `update_options`.
///
/// Every field is optional; `None` leaves the current value untouched.
/// Loadable from JSON so hosts can keep tuning in a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerOptions {
    pub height: Option<f32>,
    pub move_speed: Option<f32>,
    pub jump_speed: Option<f32>,
    pub gravity: Option<f32>,
    pub look_sensitivity: Option<f32>,
    pub max_pitch: Option<f32>,
    pub sprint_multiplier: Option<f32>,
    /// Vertical field of view in degrees
    pub fov: Option<f32>,
    pub pointer_lock_enabled: Option<bool>,
    pub auto_lock: Option<bool>,
    pub crouch_enabled: Option<bool>,
    pub crouch_height: Option<f32>,
    pub crouch_speed_multiplier: Option<f32>,
    pub max_step_height: Option<f32>,
    pub max_slope_angle: Option<f32>,
    pub start_position: Option<Vec3>,
}

impl ControllerOptions {
    /// Parse options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse an options file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Overlay the movement fields onto `base`.
    pub fn player_config(&self, base: &PlayerConfig) -> PlayerConfig {
        PlayerConfig {
            height: self.height.unwrap_or(base.height),
            move_speed: self.move_speed.unwrap_or(base.move_speed),
            jump_speed: self.jump_speed.unwrap_or(base.jump_speed),
            gravity: self.gravity.unwrap_or(base.gravity),
        }
    }

    /// Whether any movement field is set.
    pub fn touches_player_config(&self) -> bool {
        self.height.is_some()
            || self.move_speed.is_some()
            || self.jump_speed.is_some()
            || self.gravity.is_some()
    }
}
