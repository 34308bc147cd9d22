//! Action Input Module
//!
//! Maps physical keys to the six semantic movement actions and tracks which
//! actions are currently held. Physical keys are `winit` key codes, which
//! follow the layout-independent naming of the platform (`KeyW`, `Space`,
//! `ShiftLeft`, ...).
//!
//! # Usage
//!
//! ```rust,ignore
//! use fp_controls_engine::input::{Action, ActionInput};
//! use winit::keyboard::KeyCode;
//!
//! let mut input = ActionInput::new();
//! input.set_focus(true);
//! input.handle_key(KeyCode::KeyW, true);
//! assert!(input.is_action_pressed(Action::Forward));
//! ```

use std::collections::{HashMap, HashSet};

use winit::keyboard::KeyCode;

/// Semantic movement actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move forward (default: W, ArrowUp)
    Forward,
    /// Move backward (default: S, ArrowDown)
    Backward,
    /// Strafe left (default: A, ArrowLeft)
    Left,
    /// Strafe right (default: D, ArrowRight)
    Right,
    /// Jump (default: Space)
    Jump,
    /// Sprint modifier (default: either Shift)
    Sprint,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Sprint,
    ];
}

/// Action to key-list mapping. An action may have several keys; a key may
/// serve several actions.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    action_to_keys: HashMap<Action, Vec<KeyCode>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindings {
    /// Default bindings:
    /// - Forward = W / ArrowUp
    /// - Backward = S / ArrowDown
    /// - Left = A / ArrowLeft
    /// - Right = D / ArrowRight
    /// - Jump = Space
    /// - Sprint = ShiftLeft / ShiftRight
    pub fn new() -> Self {
        let mut action_to_keys = HashMap::new();
        action_to_keys.insert(Action::Forward, vec![KeyCode::KeyW, KeyCode::ArrowUp]);
        action_to_keys.insert(Action::Backward, vec![KeyCode::KeyS, KeyCode::ArrowDown]);
        action_to_keys.insert(Action::Left, vec![KeyCode::KeyA, KeyCode::ArrowLeft]);
        action_to_keys.insert(Action::Right, vec![KeyCode::KeyD, KeyCode::ArrowRight]);
        action_to_keys.insert(Action::Jump, vec![KeyCode::Space]);
        action_to_keys.insert(Action::Sprint, vec![KeyCode::ShiftLeft, KeyCode::ShiftRight]);
        Self { action_to_keys }
    }

    /// Bindings with no keys assigned to any action.
    pub fn empty() -> Self {
        Self {
            action_to_keys: HashMap::new(),
        }
    }

    /// Replace the key list of `action`. An empty list unbinds the action.
    pub fn bind(&mut self, action: Action, keys: Vec<KeyCode>) {
        if keys.is_empty() {
            self.action_to_keys.remove(&action);
        } else {
            self.action_to_keys.insert(action, keys);
        }
    }

    /// Replace the key lists of every action named in `partial`, leaving the
    /// rest untouched.
    pub fn update(&mut self, partial: impl IntoIterator<Item = (Action, Vec<KeyCode>)>) {
        for (action, keys) in partial {
            self.bind(action, keys);
        }
    }

    /// Keys bound to `action`.
    pub fn keys(&self, action: Action) -> &[KeyCode] {
        self.action_to_keys
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `key` is bound to any action.
    pub fn is_bound(&self, key: KeyCode) -> bool {
        self.action_to_keys.values().any(|keys| keys.contains(&key))
    }

    /// Check if `action` is held, given the set of held keys.
    pub fn is_action_pressed(&self, action: Action, pressed_keys: &HashSet<KeyCode>) -> bool {
        self.keys(action).iter().any(|key| pressed_keys.contains(key))
    }
}

/// Snapshot of the held actions, consumed by the movement integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sprint: bool,
}

impl ActionState {
    /// Forward/backward axis (-1, 0, or 1). Opposite keys cancel.
    pub fn forward_axis(&self) -> i32 {
        (self.forward as i32) - (self.backward as i32)
    }

    /// Right/left axis (-1, 0, or 1). Opposite keys cancel.
    pub fn right_axis(&self) -> i32 {
        (self.right as i32) - (self.left as i32)
    }
}

/// Held-key tracker gated by input focus or an active pointer lock.
#[derive(Debug, Clone, Default)]
pub struct ActionInput {
    bindings: KeyBindings,
    pressed: HashSet<KeyCode>,
    /// Whether the input target currently has keyboard focus
    has_focus: bool,
    /// Whether pointer lock is engaged (processes keys regardless of focus)
    pointer_lock_active: bool,
}

impl ActionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Default::default()
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Replace the key lists of the named actions.
    pub fn update_bindings(&mut self, partial: impl IntoIterator<Item = (Action, Vec<KeyCode>)>) {
        self.bindings.update(partial);
        let bindings = &self.bindings;
        self.pressed.retain(|key| bindings.is_bound(*key));
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.has_focus = focused;
        if !focused && !self.pointer_lock_active {
            self.pressed.clear();
        }
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Gate key processing on pointer lock, independent of focus.
    pub fn set_pointer_lock_active(&mut self, active: bool) {
        self.pointer_lock_active = active;
    }

    pub fn is_pointer_lock_active(&self) -> bool {
        self.pointer_lock_active
    }

    /// Whether key presses are currently accepted.
    pub fn is_accepting_input(&self) -> bool {
        self.pointer_lock_active || self.has_focus
    }

    /// Record a key press or release.
    ///
    /// Presses are dropped while input is not accepted or the key is
    /// unbound. Releases always go through, bound or not, so keys cannot get
    /// stuck. Returns `true` if a bound press was recorded or a held key was
    /// released.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        if !pressed {
            return self.pressed.remove(&key);
        }
        if !self.bindings.is_bound(key) || !self.is_accepting_input() {
            return false;
        }
        self.pressed.insert(key);
        true
    }

    pub fn is_action_pressed(&self, action: Action) -> bool {
        self.bindings.is_action_pressed(action, &self.pressed)
    }

    pub fn action_state(&self) -> ActionState {
        ActionState {
            forward: self.is_action_pressed(Action::Forward),
            backward: self.is_action_pressed(Action::Backward),
            left: self.is_action_pressed(Action::Left),
            right: self.is_action_pressed(Action::Right),
            jump: self.is_action_pressed(Action::Jump),
            sprint: self.is_action_pressed(Action::Sprint),
        }
    }

    /// Release every held key.
    pub fn reset(&mut self) {
        self.pressed.clear();
    }
}
