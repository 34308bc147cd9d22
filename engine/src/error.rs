//! Error types
//!
//! Only construction and option loading can fail. The per-frame update, look
//! handling and every setter clamp or degrade instead of erroring.

use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, ControlsError>;

/// Errors surfaced by the controller API
#[derive(Error, Debug)]
pub enum ControlsError {
    /// Builder finished without a camera to drive
    #[error("no camera bound: call `.camera(...)` before `build()`")]
    MissingCamera,

    /// Builder finished without an input target (pointer-lock backend)
    #[error("no input target bound: call `.input_target(...)` before `build()`")]
    MissingInputTarget,

    /// Options document could not be parsed
    #[error("invalid options: {0}")]
    OptionsParse(#[from] serde_json::Error),

    /// Options file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
