//! Player Crouch System
//!
//! Tracks the crouch flag and blends the eye height between standing and
//! crouching.
//!
//! # Height Blending
//!
//! The blended height chases its target exponentially at [`HEIGHT_BLEND_RATE`]
//! per second and snaps onto it once within [`HEIGHT_SNAP_EPSILON`]. The blend
//! is frame-rate independent only to first order, which is enough for a
//! visual transition.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fp_controls_engine::player::CrouchState;
//!
//! let mut crouch = CrouchState::new(1.8);
//! crouch.set_crouching(true);
//!
//! // Each frame:
//! let eye_height = crouch.blend(delta_time, standing_height);
//! let speed = move_speed * crouch.speed_multiplier();
//! ```

use crate::config::{
    CROUCH_HEIGHT_RATIO, DEFAULT_CROUCH_SPEED_MULTIPLIER, HEIGHT_BLEND_RATE, HEIGHT_SNAP_EPSILON,
    MAX_CROUCH_SPEED_MULTIPLIER, MIN_CROUCH_HEIGHT, MIN_CROUCH_SPEED_MULTIPLIER, clamp_finite,
};

/// Crouch flag and blended eye height.
#[derive(Debug, Clone, PartialEq)]
pub struct CrouchState {
    /// Whether crouching is allowed at all
    enabled: bool,

    /// Requested crouch; only effective while enabled
    crouching: bool,

    /// Explicit crouch height; `None` derives it from the standing height
    crouch_height: Option<f32>,

    /// Movement speed scalar while crouching
    speed_multiplier: f32,

    /// Blended eye height used for ground resting
    current_height: f32,
}

impl CrouchState {
    /// Create a standing crouch state at `standing_height`.
    pub fn new(standing_height: f32) -> Self {
        Self {
            enabled: true,
            crouching: false,
            crouch_height: None,
            speed_multiplier: DEFAULT_CROUCH_SPEED_MULTIPLIER,
            current_height: standing_height,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the rig is effectively crouching (requested and enabled).
    #[inline]
    pub fn is_crouching(&self) -> bool {
        self.enabled && self.crouching
    }

    #[inline]
    pub fn current_height(&self) -> f32 {
        self.current_height
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_crouching(&mut self, crouching: bool) {
        self.crouching = crouching;
    }

    /// Flip the crouch request. Returns the new effective state.
    pub fn toggle(&mut self) -> bool {
        self.crouching = !self.crouching;
        self.is_crouching()
    }

    /// Override the crouch height. Clamped against the standing height when read.
    pub fn set_crouch_height(&mut self, height: f32) {
        if let Some(height) = clamp_finite("crouch_height", height, MIN_CROUCH_HEIGHT, f32::MAX) {
            self.crouch_height = Some(height);
        }
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        if let Some(value) = clamp_finite(
            "crouch_speed_multiplier",
            multiplier,
            MIN_CROUCH_SPEED_MULTIPLIER,
            MAX_CROUCH_SPEED_MULTIPLIER,
        ) {
            self.speed_multiplier = value;
        }
    }

    /// Crouch height for a given standing height, within `[0.3, standing]`.
    ///
    /// A standing height below 0.3 wins over the lower bound.
    pub fn crouch_height(&self, standing_height: f32) -> f32 {
        self.crouch_height
            .unwrap_or(standing_height * CROUCH_HEIGHT_RATIO)
            .max(MIN_CROUCH_HEIGHT)
            .min(standing_height)
    }

    /// Height the blend is chasing.
    pub fn target_height(&self, standing_height: f32) -> f32 {
        if self.is_crouching() {
            self.crouch_height(standing_height)
        } else {
            standing_height
        }
    }

    /// Movement speed scalar for the current stance.
    pub fn speed_multiplier(&self) -> f32 {
        if self.is_crouching() {
            self.speed_multiplier
        } else {
            1.0
        }
    }

    /// Configured crouch speed scalar, regardless of stance.
    pub fn crouch_speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Advance the height blend by `dt` seconds and return the new height.
    pub fn blend(&mut self, dt: f32, standing_height: f32) -> f32 {
        let target = self.target_height(standing_height);
        let t = (dt * HEIGHT_BLEND_RATE).min(1.0);
        self.current_height += (target - self.current_height) * t;
        if (target - self.current_height).abs() < HEIGHT_SNAP_EPSILON {
            self.current_height = target;
        }
        self.current_height
    }

    /// Jump straight to the target height.
    pub fn snap(&mut self, standing_height: f32) {
        self.current_height = self.target_height(standing_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_default_state() {
        let crouch = CrouchState::new(1.8);
        assert!(crouch.is_enabled());
        assert!(!crouch.is_crouching());
        assert!(approx_eq(crouch.current_height(), 1.8));
        assert_eq!(crouch.speed_multiplier(), 1.0);
    }

    #[test]
    fn test_derived_crouch_height() {
        let crouch = CrouchState::new(1.8);
        assert!(approx_eq(crouch.crouch_height(1.8), 1.08));
        // Ratio result below the floor is lifted to 0.3
        assert!(approx_eq(crouch.crouch_height(0.4), 0.3));
        // A very short rig cannot crouch above its own height
        assert!(approx_eq(crouch.crouch_height(0.2), 0.2));
    }

    #[test]
    fn test_explicit_crouch_height_clamped() {
        let mut crouch = CrouchState::new(1.8);
        crouch.set_crouch_height(5.0);
        assert!(approx_eq(crouch.crouch_height(1.8), 1.8));
        crouch.set_crouch_height(0.05);
        assert!(approx_eq(crouch.crouch_height(1.8), 0.3));
    }

    #[test]
    fn test_crouch_ignored_when_disabled() {
        let mut crouch = CrouchState::new(1.8);
        crouch.set_enabled(false);
        crouch.set_crouching(true);
        assert!(!crouch.is_crouching());
        assert!(approx_eq(crouch.target_height(1.8), 1.8));
        assert_eq!(crouch.speed_multiplier(), 1.0);

        // Re-enabling honors the stored request
        crouch.set_enabled(true);
        assert!(crouch.is_crouching());
    }

    #[test]
    fn test_blend_is_exponential() {
        let mut crouch = CrouchState::new(1.8);
        crouch.set_crouching(true);

        // One 16ms frame covers 16% of the gap
        let height = crouch.blend(0.016, 1.8);
        let expected = 1.8 + (1.08 - 1.8) * 0.16;
        assert!(approx_eq(height, expected));
        assert!(height > 1.08);
    }

    #[test]
    fn test_blend_snaps_to_target() {
        let mut crouch = CrouchState::new(1.8);
        crouch.set_crouching(true);
        for _ in 0..200 {
            crouch.blend(0.016, 1.8);
        }
        assert_eq!(crouch.current_height(), crouch.crouch_height(1.8));
    }

    #[test]
    fn test_large_step_reaches_target() {
        let mut crouch = CrouchState::new(1.8);
        crouch.set_crouching(true);
        assert_eq!(crouch.blend(0.5, 1.8), crouch.crouch_height(1.8));
    }

    #[test]
    fn test_toggle() {
        let mut crouch = CrouchState::new(1.8);
        assert!(crouch.toggle());
        assert!(!crouch.toggle());
    }

    #[test]
    fn test_speed_multiplier_clamped() {
        let mut crouch = CrouchState::new(1.8);
        crouch.set_speed_multiplier(3.0);
        assert_eq!(crouch.crouch_speed_multiplier(), 1.0);
        crouch.set_speed_multiplier(0.0);
        assert_eq!(crouch.crouch_speed_multiplier(), 0.05);
        crouch.set_crouching(true);
        assert_eq!(crouch.speed_multiplier(), 0.05);
    }

    #[test]
    fn test_snap() {
        let mut crouch = CrouchState::new(1.8);
        crouch.set_crouching(true);
        crouch.snap(1.8);
        assert!(approx_eq(crouch.current_height(), 1.08));
    }
}
