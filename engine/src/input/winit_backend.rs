//! Winit integration
//!
//! Pointer capture through `Window::set_cursor_grab` and a small translation
//! layer from winit events to controller input.
//!
//! `CursorGrabMode::Locked` is tried first; platforms that cannot lock (X11,
//! Windows) fall back to `Confined`. Either grab counts as an engaged lock.

use std::sync::Arc;

use tracing::warn;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window};

use super::pointer_lock::PointerLockBackend;

/// Pointer-lock backend for a winit window.
#[derive(Debug)]
pub struct WinitPointerLock {
    window: Arc<Window>,
    pending: Option<bool>,
}

impl WinitPointerLock {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl PointerLockBackend for WinitPointerLock {
    fn is_supported(&self) -> bool {
        true
    }

    fn request_lock(&mut self) {
        let grabbed = self.window.set_cursor_grab(CursorGrabMode::Locked).is_ok()
            || self.window.set_cursor_grab(CursorGrabMode::Confined).is_ok();
        if grabbed {
            self.window.set_cursor_visible(false);
            self.pending = Some(true);
        } else {
            warn!(target: "controls", "cursor grab refused by the platform");
        }
    }

    fn exit_lock(&mut self) {
        if let Err(err) = self.window.set_cursor_grab(CursorGrabMode::None) {
            warn!(target: "controls", %err, "cursor release failed");
        }
        self.window.set_cursor_visible(true);
        self.pending = Some(false);
    }

    fn poll_change(&mut self) -> Option<bool> {
        self.pending.take()
    }
}

/// Extract `(key, pressed)` from a winit keyboard event.
///
/// Returns `None` for unidentified keys and for auto-repeat presses, which
/// carry no new held-state information.
pub fn key_from_event(event: &KeyEvent) -> Option<(KeyCode, bool)> {
    if event.repeat {
        return None;
    }
    match event.physical_key {
        PhysicalKey::Code(code) => Some((code, event.state == ElementState::Pressed)),
        PhysicalKey::Unidentified(_) => None,
    }
}
