//! Player Module
//!
//! The rig body and its physics.
//!
//! # Components
//!
//! - [`MovementIntegrator`] - per-frame movement, jump, gravity and ground resolution
//! - [`CrouchState`] - crouch flag with exponential eye-height blending
//! - [`GravityModel`] / [`GroundModel`] - pluggable gravity and ground checks
//!   - [`SphericalGravity`] - radial gravity toward a planet center
//! - [`ControllerState`] - copyable snapshot handed to callers and ground checks

pub mod crouch;
pub mod integrator;
pub mod physics;
pub mod state;

pub use crouch::CrouchState;
pub use integrator::{MovementIntegrator, StepOutcome, is_valid_delta};
pub use physics::{
    GravityField, GravityModel, GroundCheck, GroundHit, GroundLimits, GroundModel,
    SphericalGravity,
};
pub use state::{ControllerState, DebugInfo};
