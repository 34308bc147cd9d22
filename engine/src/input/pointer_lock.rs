//! Pointer Lock Module
//!
//! Tracks exclusive pointer capture for mouse-look and decides which raw
//! pointer-motion samples are eligible to rotate the camera.
//!
//! The host-specific part (actually grabbing the cursor) lives behind
//! [`PointerLockBackend`]. Acquisition is fire-and-forget: a backend reports
//! the outcome later through [`PointerLockBackend::poll_change`], or the host
//! calls [`PointerLockState::handle_lock_change`] itself (for example when the
//! window loses focus and the OS drops the grab).
//!
//! # Eligibility
//!
//! - Lock enabled: motion counts only while the lock is engaged.
//! - Lock disabled: motion counts only while the input target has focus or the
//!   sample originates inside it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fp_controls_engine::input::{HeadlessPointerLock, PointerLockState};
//!
//! let mut lock = PointerLockState::new(Box::new(HeadlessPointerLock::granting()));
//! lock.request_lock();
//! lock.poll();                 // backend grants the request
//! assert!(lock.is_locked());
//! ```

use glam::Vec2;
use tracing::info;

/// Host side of pointer capture.
pub trait PointerLockBackend {
    /// Whether the host can capture the pointer at all.
    fn is_supported(&self) -> bool;

    /// Ask the host for exclusive capture. The result arrives later through
    /// [`poll_change`](Self::poll_change).
    fn request_lock(&mut self);

    /// Release capture.
    fn exit_lock(&mut self);

    /// Drain the latest lock-state transition observed by the host.
    fn poll_change(&mut self) -> Option<bool> {
        None
    }
}

/// Backend with no window behind it.
///
/// `granting()` grants every request on the next poll, `unsupported()` models a
/// host without pointer capture, `manual()` leaves every transition to the
/// caller through `handle_lock_change`.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPointerLock {
    supported: bool,
    grant_requests: bool,
    pending: Option<bool>,
}

impl HeadlessPointerLock {
    pub fn granting() -> Self {
        Self {
            supported: true,
            grant_requests: true,
            pending: None,
        }
    }

    pub fn manual() -> Self {
        Self {
            supported: true,
            grant_requests: false,
            pending: None,
        }
    }

    pub fn unsupported() -> Self {
        Self::default()
    }
}

impl PointerLockBackend for HeadlessPointerLock {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn request_lock(&mut self) {
        if self.supported && self.grant_requests {
            self.pending = Some(true);
        }
    }

    fn exit_lock(&mut self) {
        if self.supported {
            self.pending = Some(false);
        }
    }

    fn poll_change(&mut self) -> Option<bool> {
        self.pending.take()
    }
}

/// A raw pointer-motion sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotion {
    /// Horizontal movement in device units. Positive = right.
    pub dx: f32,
    /// Vertical movement in device units. Positive = down.
    pub dy: f32,
    /// Whether the sample originated inside the input target
    pub within_target: bool,
}

impl PointerMotion {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self {
            dx,
            dy,
            within_target: false,
        }
    }

    pub fn within_target(mut self) -> Self {
        self.within_target = true;
        self
    }
}

type LockCallback = Box<dyn FnMut(bool)>;

/// Pointer-lock state tracker.
pub struct PointerLockState {
    backend: Box<dyn PointerLockBackend>,
    /// Whether mouse-look requires pointer lock
    enabled: bool,
    /// Whether a pointer press on the target requests lock
    auto_lock: bool,
    /// Whether the lock is currently engaged
    locked: bool,
    /// Whether the input target has focus
    has_focus: bool,
    on_change: Option<LockCallback>,
}

impl std::fmt::Debug for PointerLockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerLockState")
            .field("supported", &self.backend.is_supported())
            .field("enabled", &self.enabled)
            .field("auto_lock", &self.auto_lock)
            .field("locked", &self.locked)
            .field("has_focus", &self.has_focus)
            .finish()
    }
}

impl PointerLockState {
    /// Create a tracker with lock and auto-lock enabled.
    ///
    /// An unsupported backend starts (and stays) disabled.
    pub fn new(backend: Box<dyn PointerLockBackend>) -> Self {
        let supported = backend.is_supported();
        Self {
            backend,
            enabled: supported,
            auto_lock: supported,
            locked: false,
            has_focus: false,
            on_change: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.backend.is_supported()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_auto_lock_enabled(&self) -> bool {
        self.auto_lock
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.has_focus = focused;
    }

    /// Register the callback fired with the new locked flag on every transition.
    pub fn on_change(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn clear_callbacks(&mut self) {
        self.on_change = None;
    }

    /// Enable or disable lock-based mouse-look. Disabling exits a held lock.
    pub fn set_enabled(&mut self, enabled: bool) {
        let enabled = enabled && self.is_supported();
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        info!(target: "controls", enabled, "pointer lock enablement changed");
        if !enabled && self.locked {
            self.exit_lock();
        }
    }

    pub fn set_auto_lock(&mut self, auto_lock: bool) {
        self.auto_lock = auto_lock && self.is_supported();
    }

    /// Request capture. No-op when unsupported, disabled or already locked.
    pub fn request_lock(&mut self) {
        if !self.enabled || self.locked {
            return;
        }
        info!(target: "controls", reason = "request", "pointer lock requested");
        self.backend.request_lock();
    }

    /// Release capture if held.
    pub fn exit_lock(&mut self) {
        if !self.locked {
            return;
        }
        info!(target: "controls", reason = "exit", "pointer lock release requested");
        self.backend.exit_lock();
    }

    /// Handle a pointer press on the target. Requests lock when auto-lock is on.
    ///
    /// Returns `true` if a lock request was issued.
    pub fn handle_pointer_down(&mut self) -> bool {
        self.has_focus = true;
        if self.auto_lock && self.enabled && !self.locked {
            self.request_lock();
            true
        } else {
            false
        }
    }

    /// Apply a lock-state transition reported by the host.
    ///
    /// Returns `true` if the state changed (and the callback fired).
    pub fn handle_lock_change(&mut self, locked: bool) -> bool {
        let locked = locked && self.is_supported();
        if self.locked == locked {
            return false;
        }
        self.locked = locked;
        info!(target: "controls", locked, "pointer lock changed");
        if let Some(callback) = self.on_change.as_mut() {
            callback(locked);
        }
        true
    }

    /// Drain pending transitions from the backend.
    ///
    /// Returns the new locked flag if it changed.
    pub fn poll(&mut self) -> Option<bool> {
        let mut changed = None;
        while let Some(locked) = self.backend.poll_change() {
            if self.handle_lock_change(locked) {
                changed = Some(self.locked);
            }
        }
        changed
    }

    /// Whether a motion sample may rotate the camera.
    pub fn is_motion_eligible(&self, motion: &PointerMotion) -> bool {
        if self.enabled {
            self.locked
        } else {
            self.has_focus || motion.within_target
        }
    }

    /// Relay the sample's delta if eligible.
    pub fn filter_motion(&self, motion: PointerMotion) -> Option<Vec2> {
        self.is_motion_eligible(&motion)
            .then(|| Vec2::new(motion.dx, motion.dy))
    }

    /// Release capture and drop callbacks. Leaves the tracker disabled.
    pub fn shutdown(&mut self) {
        if self.locked {
            self.backend.exit_lock();
            self.locked = false;
        }
        self.enabled = false;
        self.auto_lock = false;
        self.on_change = None;
    }
}
