//! Rig state snapshots handed out to callers and custom ground checks.

use glam::Vec3;

/// Snapshot of the rig.
///
/// `Copy`, so every snapshot is independent of the controller and of every
/// other snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    /// Eye position in world space
    pub position: Vec3,
    /// `y` is gravity-driven; `x`/`z` are the last frame's input speed
    pub velocity: Vec3,
    /// Radians, unbounded
    pub yaw: f32,
    /// Radians, within `±max_pitch`
    pub pitch: f32,
    pub on_ground: bool,
    /// Blended eye height (standing or crouching)
    pub current_height: f32,
    /// Floor elevation of the last ground contact
    pub ground_level: f32,
}

impl ControllerState {
    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }
}

/// Condensed readout for overlays and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugInfo {
    pub horizontal_speed: f32,
    pub on_ground: bool,
    pub yaw: f32,
    pub pitch: f32,
    pub velocity: Vec3,
    pub pointer_locked: bool,
}

impl DebugInfo {
    pub fn from_state(state: &ControllerState, pointer_locked: bool) -> Self {
        Self {
            horizontal_speed: state.horizontal_speed(),
            on_ground: state.on_ground,
            yaw: state.yaw,
            pitch: state.pitch,
            velocity: state.velocity,
            pointer_locked,
        }
    }
}

impl std::fmt::Display for DebugInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "speed {:.2} m/s | {} | yaw {:.1}° pitch {:.1}° | vy {:.2} | {}",
            self.horizontal_speed,
            if self.on_ground { "grounded" } else { "airborne" },
            self.yaw.to_degrees(),
            self.pitch.to_degrees(),
            self.velocity.y,
            if self.pointer_locked { "locked" } else { "unlocked" },
        )
    }
}
