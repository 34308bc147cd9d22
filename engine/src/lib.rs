//! First-Person Controls Library
//!
//! A first-person camera rig: mouse-look with pointer lock, camera-relative
//! walking, sprinting, crouching and jumping over a pluggable gravity and
//! ground model.
//!
//! # Modules
//!
//! - [`camera`] - Look integrator, look-only controller and camera sinks
//! - [`input`] - Key-to-action mapping and pointer-lock state
//! - [`player`] - Movement integrator, crouch blending and physics models
//! - [`controller`] - The full [`FirstPersonController`]
//! - [`config`] - Tuning constants and serializable options
//!
//! # Example
//!
//! ```ignore
//! use fp_controls_engine::{
//!     ControllerOptions, FirstPersonController, HeadlessPointerLock, PerspectiveCamera,
//!     PointerMotion,
//! };
//! use winit::keyboard::KeyCode;
//!
//! let mut controller = FirstPersonController::builder()
//!     .camera(PerspectiveCamera::new(16.0 / 9.0))
//!     .input_target(HeadlessPointerLock::granting())
//!     .options(ControllerOptions {
//!         move_speed: Some(6.0),
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! controller.lock_pointer();
//! controller.handle_key(KeyCode::KeyW, true);
//! controller.handle_pointer_motion(PointerMotion::new(40.0, 0.0));
//! controller.update(1.0 / 60.0);
//!
//! let state = controller.state();
//! println!("{:?} on_ground={}", state.position, state.on_ground);
//! ```

pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod player;

pub use camera::{
    ApplyOptions, CameraSink, LookController, LookControllerBuilder, LookIntegrator,
    PerspectiveCamera,
};
pub use config::{ControllerOptions, PlayerConfig};
pub use controller::{FirstPersonController, FirstPersonControllerBuilder};
pub use error::{ControlsError, Result};
pub use input::{
    Action, ActionInput, ActionState, HeadlessPointerLock, KeyBindings, PointerLockBackend,
    PointerLockState, PointerMotion, WinitPointerLock,
};
pub use player::{
    ControllerState, DebugInfo, GravityField, GravityModel, GroundCheck, GroundHit, GroundModel,
    SphericalGravity,
};
