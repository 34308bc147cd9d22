//! Look Integrator
//!
//! Accumulates yaw and pitch from raw pointer deltas with no smoothing. Shared
//! by the look-only controller and the full first-person controller.
//!
//! # Conventions
//!
//! - `yaw` rotates about world up, unbounded (wraps through trig only)
//! - `pitch` rotates about the local right axis, clamped to `±max_pitch`
//! - Orientation is Euler `(pitch, yaw, 0)` applied Y, then X, then Z
//! - yaw = 0, pitch = 0 looks down -Z; moving the mouse right turns right
//!
//! ```rust,ignore
//! let mut look = LookIntegrator::new();
//! look.apply_pointer_delta(12.0, -4.0);
//! camera.set_orientation(look.orientation());
//! ```

use glam::{EulerRot, Quat, Vec3};

use crate::config::{
    DEFAULT_FOV_DEGREES, DEFAULT_LOOK_SENSITIVITY, DEFAULT_MAX_PITCH, MAX_FOV_DEGREES,
    MAX_LOOK_SENSITIVITY, MAX_MAX_PITCH, MIN_FOV_DEGREES, MIN_LOOK_SENSITIVITY, MIN_MAX_PITCH,
    clamp_finite,
};

type LookCallback = Box<dyn FnMut(f32, f32)>;

/// Yaw/pitch accumulator with a look-change callback.
pub struct LookIntegrator {
    yaw: f32,
    pitch: f32,
    /// Radians per device unit
    sensitivity: f32,
    max_pitch: f32,
    fov_degrees: f32,
    on_look_change: Option<LookCallback>,
}

impl std::fmt::Debug for LookIntegrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookIntegrator")
            .field("yaw", &self.yaw)
            .field("pitch", &self.pitch)
            .field("sensitivity", &self.sensitivity)
            .field("max_pitch", &self.max_pitch)
            .field("fov_degrees", &self.fov_degrees)
            .finish_non_exhaustive()
    }
}

impl Default for LookIntegrator {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: DEFAULT_LOOK_SENSITIVITY,
            max_pitch: DEFAULT_MAX_PITCH,
            fov_degrees: DEFAULT_FOV_DEGREES,
            on_look_change: None,
        }
    }
}

impl LookIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    #[inline]
    pub fn max_pitch(&self) -> f32 {
        self.max_pitch
    }

    #[inline]
    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    /// Register the callback fired with `(yaw, pitch)` after every look update.
    pub fn on_look_change(&mut self, callback: impl FnMut(f32, f32) + 'static) {
        self.on_look_change = Some(Box::new(callback));
    }

    pub fn clear_callbacks(&mut self) {
        self.on_look_change = None;
    }

    /// Apply a pointer delta.
    ///
    /// * `dx` - positive = mouse moved right = turn right (yaw decreases)
    /// * `dy` - positive = mouse moved down = look down (pitch decreases)
    pub fn apply_pointer_delta(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-self.max_pitch, self.max_pitch);
        self.notify();
    }

    /// Set the look angles directly. `pitch` defaults to the current pitch.
    pub fn set_look_angles(&mut self, yaw: f32, pitch: Option<f32>) {
        if yaw.is_finite() {
            self.yaw = yaw;
        }
        let pitch = pitch.filter(|p| p.is_finite()).unwrap_or(self.pitch);
        self.pitch = pitch.clamp(-self.max_pitch, self.max_pitch);
        self.notify();
    }

    /// Change the pitch bound, re-clamping the current pitch.
    ///
    /// Returns `true` if the stored pitch moved (the callback fired).
    pub fn set_max_pitch(&mut self, max_pitch: f32) -> bool {
        let Some(max_pitch) = clamp_finite("max_pitch", max_pitch, MIN_MAX_PITCH, MAX_MAX_PITCH)
        else {
            return false;
        };
        self.max_pitch = max_pitch;
        let clamped = self.pitch.clamp(-max_pitch, max_pitch);
        if clamped != self.pitch {
            self.pitch = clamped;
            self.notify();
            true
        } else {
            false
        }
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        if let Some(value) =
            clamp_finite("look_sensitivity", sensitivity, MIN_LOOK_SENSITIVITY, MAX_LOOK_SENSITIVITY)
        {
            self.sensitivity = value;
        }
    }

    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        if let Some(value) = clamp_finite("fov", fov_degrees, MIN_FOV_DEGREES, MAX_FOV_DEGREES) {
            self.fov_degrees = value;
        }
    }

    /// Full look orientation.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    fn notify(&mut self) {
        let (yaw, pitch) = (self.yaw, self.pitch);
        if let Some(callback) = self.on_look_change.as_mut() {
            callback(yaw, pitch);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_default_values() {
        let look = LookIntegrator::new();
        assert_eq!(look.yaw(), 0.0);
        assert_eq!(look.pitch(), 0.0);
        assert_eq!(look.sensitivity(), 0.002);
        assert!(approx_eq(look.max_pitch(), 89f32.to_radians()));
        assert_eq!(look.fov_degrees(), DEFAULT_FOV_DEGREES);
    }

    #[test]
    fn test_pointer_right_turns_right() {
        let mut look = LookIntegrator::new();
        look.apply_pointer_delta(100.0, 0.0);

        assert!(approx_eq(look.yaw(), -0.2));
        assert_eq!(look.pitch(), 0.0);
        // Looking right of -Z means +X
        assert!(look.forward().x > 0.0);
    }

    #[test]
    fn test_pointer_down_looks_down() {
        let mut look = LookIntegrator::new();
        look.apply_pointer_delta(0.0, 100.0);
        assert!(approx_eq(look.pitch(), -0.2));
        assert!(look.forward().y < 0.0);
    }

    #[test]
    fn test_pitch_clamped_both_ways() {
        let mut look = LookIntegrator::new();
        look.apply_pointer_delta(0.0, -100000.0);
        assert!(approx_eq(look.pitch(), look.max_pitch()));
        look.apply_pointer_delta(0.0, 100000.0);
        assert!(approx_eq(look.pitch(), -look.max_pitch()));
    }

    #[test]
    fn test_pitch_invariant_over_sample_sequence() {
        let mut look = LookIntegrator::new();
        look.set_max_pitch(0.7);
        let samples = [(3.0, -400.0), (-50.0, 900.0), (0.0, -12.5), (7.0, 333.0), (1.0, -1e6)];
        for (dx, dy) in samples {
            look.apply_pointer_delta(dx, dy);
            assert!(look.pitch().abs() <= look.max_pitch());
        }
    }

    #[test]
    fn test_narrowing_max_pitch_reclamps_immediately() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        let mut look = LookIntegrator::new();
        look.set_look_angles(0.0, Some(1.2));
        look.on_look_change(move |yaw, pitch| sink.borrow_mut().push((yaw, pitch)));

        assert!(look.set_max_pitch(0.5));
        assert!(approx_eq(look.pitch(), 0.5));
        assert_eq!(calls.borrow().len(), 1);

        // Widening does not move pitch and stays silent
        assert!(!look.set_max_pitch(1.0));
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_max_pitch_bound_clamped() {
        let mut look = LookIntegrator::new();
        look.set_max_pitch(10.0);
        assert!(approx_eq(look.max_pitch(), MAX_MAX_PITCH));
        look.set_max_pitch(0.0);
        assert!(approx_eq(look.max_pitch(), MIN_MAX_PITCH));
    }

    #[test]
    fn test_set_look_angles_keeps_pitch_when_omitted() {
        let mut look = LookIntegrator::new();
        look.set_look_angles(1.0, Some(0.3));
        look.set_look_angles(2.0, None);
        assert_eq!(look.yaw(), 2.0);
        assert!(approx_eq(look.pitch(), 0.3));
    }

    #[test]
    fn test_set_look_angles_fires_callback() {
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut look = LookIntegrator::new();
        look.on_look_change(move |_, _| *counter.borrow_mut() += 1);
        look.set_look_angles(0.5, Some(5.0));
        assert_eq!(*calls.borrow(), 1);
        assert!(approx_eq(look.pitch(), look.max_pitch()));
    }

    #[test]
    fn test_fov_and_sensitivity_clamped() {
        let mut look = LookIntegrator::new();
        look.set_fov_degrees(500.0);
        assert_eq!(look.fov_degrees(), MAX_FOV_DEGREES);
        look.set_fov_degrees(1.0);
        assert_eq!(look.fov_degrees(), MIN_FOV_DEGREES);

        look.set_sensitivity(-1.0);
        assert_eq!(look.sensitivity(), MIN_LOOK_SENSITIVITY);
        look.set_sensitivity(f32::NAN);
        assert_eq!(look.sensitivity(), MIN_LOOK_SENSITIVITY);
    }

    #[test]
    fn test_orientation_matches_forward() {
        let mut look = LookIntegrator::new();
        look.set_look_angles(0.8, Some(-0.4));
        let expected = Vec3::new(
            -0.8f32.sin() * (-0.4f32).cos(),
            (-0.4f32).sin(),
            -0.8f32.cos() * (-0.4f32).cos(),
        );
        assert!((look.forward() - expected).length() < EPSILON);
    }
}
