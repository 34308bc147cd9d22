//! Gravity and Ground Models
//!
//! The two pluggable physics steps of the movement integrator.
//!
//! - [`GravityField`] - acceleration as a function of position
//! - [`GroundCheck`] - decides whether the rig rests on a surface this frame
//!
//! Each has a built-in default and a custom variant, selected per controller
//! through [`GravityModel`] and [`GroundModel`]. Plain closures implement both
//! traits, so a custom model is usually a one-liner:
//!
//! ```rust,ignore
//! controller.set_gravity_model(GravityModel::custom(|p: Vec3| Vec3::new(0.0, -9.81, 0.0)));
//! controller.set_ground_model(GroundModel::custom(|state: &ControllerState, _dt: f32| {
//!     let floor = terrain.height_at(state.position.x, state.position.z);
//!     GroundHit::at_level(state.position.y <= floor + state.current_height, floor)
//! }));
//! ```
//!
//! # Ground Limits
//!
//! [`GroundLimits`] post-filters every hit:
//! - a surface normal steeper than `max_slope_angle` is not ground
//! - a snap larger than `max_step_height` is a ledge or wall, not ground

use glam::Vec3;

use super::state::ControllerState;
use crate::config::{MAX_SLOPE_LIMIT, clamp_finite};

/// Position-dependent gravity.
pub trait GravityField {
    /// Acceleration in m/s^2 at `position`.
    fn acceleration(&self, position: Vec3) -> Vec3;
}

impl<F> GravityField for F
where
    F: Fn(Vec3) -> Vec3,
{
    fn acceleration(&self, position: Vec3) -> Vec3 {
        self(position)
    }
}

/// Result of a ground check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub grounded: bool,
    /// Surface normal, if the check knows it
    pub normal: Option<Vec3>,
    /// Floor elevation under the rig; `None` means 0
    pub ground_level: Option<f32>,
}

impl GroundHit {
    /// Not on any surface.
    pub fn airborne() -> Self {
        Self {
            grounded: false,
            normal: None,
            ground_level: None,
        }
    }

    /// Flat floor at elevation 0 with an up normal.
    pub fn flat(grounded: bool) -> Self {
        Self {
            grounded,
            normal: grounded.then_some(Vec3::Y),
            ground_level: None,
        }
    }

    /// Flat floor at the given elevation.
    pub fn at_level(grounded: bool, ground_level: f32) -> Self {
        Self {
            ground_level: Some(ground_level),
            ..Self::flat(grounded)
        }
    }

    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = Some(normal);
        self
    }

    /// Floor elevation, defaulting to 0.
    pub fn level(&self) -> f32 {
        self.ground_level.unwrap_or(0.0)
    }
}

/// Ground predicate evaluated once per frame after gravity.
pub trait GroundCheck {
    fn check(&self, state: &ControllerState, dt: f32) -> GroundHit;
}

impl<F> GroundCheck for F
where
    F: Fn(&ControllerState, f32) -> GroundHit,
{
    fn check(&self, state: &ControllerState, dt: f32) -> GroundHit {
        self(state, dt)
    }
}

/// Radial gravity toward a planet center.
///
/// In spherical mode:
/// - "Down" points toward the planet center
/// - "Up" points away from it (the surface normal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalGravity {
    /// Center of the planet in world coordinates
    pub planet_center: Vec3,
    /// Radius of the planet surface in meters
    pub planet_radius: f32,
    /// Acceleration magnitude in m/s^2
    pub strength: f32,
}

impl SphericalGravity {
    pub fn new(planet_center: Vec3, planet_radius: f32, strength: f32) -> Self {
        Self {
            planet_center,
            planet_radius,
            strength,
        }
    }

    /// Surface normal at `position`, falling back to +Y at the center.
    pub fn up_at(&self, position: Vec3) -> Vec3 {
        (position - self.planet_center).try_normalize().unwrap_or(Vec3::Y)
    }

    /// Signed distance above the surface.
    pub fn height_above_surface(&self, position: Vec3) -> f32 {
        (position - self.planet_center).length() - self.planet_radius
    }

    /// Point on the surface straight below (or above) `position`.
    pub fn surface_position(&self, position: Vec3) -> Vec3 {
        self.planet_center + self.up_at(position) * self.planet_radius
    }
}

impl GravityField for SphericalGravity {
    fn acceleration(&self, position: Vec3) -> Vec3 {
        -self.up_at(position) * self.strength
    }
}

/// Gravity selection for a controller.
pub enum GravityModel {
    /// `(0, -gravity, 0)` with the configured magnitude
    Constant,
    Spherical(SphericalGravity),
    Custom(Box<dyn GravityField>),
}

impl Default for GravityModel {
    fn default() -> Self {
        Self::Constant
    }
}

impl std::fmt::Debug for GravityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant => f.write_str("Constant"),
            Self::Spherical(config) => f.debug_tuple("Spherical").field(config).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl GravityModel {
    pub fn custom(field: impl GravityField + 'static) -> Self {
        Self::Custom(Box::new(field))
    }

    /// Acceleration at `position`. `gravity` is the constant-model magnitude.
    pub fn acceleration(&self, position: Vec3, gravity: f32) -> Vec3 {
        match self {
            Self::Constant => Vec3::new(0.0, -gravity, 0.0),
            Self::Spherical(field) => field.acceleration(position),
            Self::Custom(field) => field.acceleration(position),
        }
    }
}

/// Ground-check selection for a controller.
pub enum GroundModel {
    /// Flat floor at 0: grounded iff the eye is at or below the blended height
    Height,
    Custom(Box<dyn GroundCheck>),
}

impl Default for GroundModel {
    fn default() -> Self {
        Self::Height
    }
}

impl std::fmt::Debug for GroundModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Height => f.write_str("Height"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl GroundModel {
    pub fn custom(check: impl GroundCheck + 'static) -> Self {
        Self::Custom(Box::new(check))
    }

    pub fn check(&self, state: &ControllerState, dt: f32) -> GroundHit {
        match self {
            Self::Height if state.position.y <= state.current_height => GroundHit::flat(true),
            Self::Height => GroundHit::airborne(),
            Self::Custom(check) => check.check(state, dt),
        }
    }
}

/// Optional slope and step filters applied to every ground hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundLimits {
    /// Largest snap, in meters, still treated as ground
    pub max_step_height: Option<f32>,
    /// Steepest walkable surface, in radians from up
    pub max_slope_angle: Option<f32>,
}

impl GroundLimits {
    /// Set or clear the step limit. Negative values clamp to 0.
    pub fn set_max_step_height(&mut self, height: Option<f32>) {
        match height {
            None => self.max_step_height = None,
            Some(h) => {
                if let Some(h) = clamp_finite("max_step_height", h, 0.0, f32::MAX) {
                    self.max_step_height = Some(h);
                }
            }
        }
    }

    /// Set or clear the slope limit, clamped into `[0, π/2]`.
    pub fn set_max_slope_angle(&mut self, angle: Option<f32>) {
        match angle {
            None => self.max_slope_angle = None,
            Some(a) => {
                if let Some(a) = clamp_finite("max_slope_angle", a, 0.0, MAX_SLOPE_LIMIT) {
                    self.max_slope_angle = Some(a);
                }
            }
        }
    }

    /// Whether a surface with `normal` is too steep to stand on.
    pub fn is_too_steep(&self, normal: Vec3) -> bool {
        match self.max_slope_angle {
            Some(limit) if normal.length_squared() > 0.0 => Vec3::Y.angle_between(normal) > limit,
            _ => false,
        }
    }

    /// Whether snapping from `y` to `resting_y` exceeds the step limit.
    pub fn is_step_too_high(&self, resting_y: f32, y: f32) -> bool {
        self.max_step_height
            .is_some_and(|limit| (resting_y - y).abs() > limit)
    }

    /// Filter `hit`: slope first, then step.
    pub fn apply(&self, mut hit: GroundHit, resting_y: f32, y: f32) -> GroundHit {
        if !hit.grounded {
            return hit;
        }
        if hit.normal.is_some_and(|normal| self.is_too_steep(normal)) {
            hit.grounded = false;
        } else if self.is_step_too_high(resting_y, y) {
            hit.grounded = false;
        }
        hit
    }
}
