//! Engine error types
//!
//! None of these escape to the host: configuration errors are replaced by
//! defaults, an unavailable surface skips the tick, and an unsupported host
//! disables the engine.

use thiserror::Error;

/// Particle engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Color string that is not `#rgb` or `#rrggbb`
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// Numeric setting outside its accepted range
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },

    /// Container not mounted or zero-sized
    #[error("Drawing surface unavailable")]
    SurfaceUnavailable,

    /// Host cannot provide 2D drawing
    #[error("Unsupported host: {0}")]
    Unsupported(String),

    /// Malformed configuration document
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
