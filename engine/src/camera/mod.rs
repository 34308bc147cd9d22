//! Camera Module
//!
//! Look handling and the camera-facing end of the rig. This module is
//! window-system agnostic - it only deals with orientation state and math.

pub mod look;
pub mod look_controller;
pub mod sink;

pub use look::LookIntegrator;
pub use look_controller::{ApplyOptions, LookController, LookControllerBuilder};
pub use sink::{CameraSink, PerspectiveCamera};
