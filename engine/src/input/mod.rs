//! Input Module
//!
//! The two input-facing leaves of the controller:
//!
//! - [`ActionInput`] - physical keys → six semantic actions, held-state tracking
//! - [`PointerLockState`] - pointer capture and mouse-motion eligibility
//!
//! Both are window-system agnostic; [`winit_backend`] adapts them to a winit
//! window.

pub mod actions;
pub mod pointer_lock;
pub mod winit_backend;

pub use actions::{Action, ActionInput, ActionState, KeyBindings};
pub use pointer_lock::{HeadlessPointerLock, PointerLockBackend, PointerLockState, PointerMotion};
pub use winit_backend::{WinitPointerLock, key_from_event};
