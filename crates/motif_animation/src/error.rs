//! Animation error types
//!
//! Tween calls never fail; they clamp and default instead. Errors are reserved
//! for operations that address authored clips and instances by id.

use thiserror::Error;

/// Clip and instance errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// No clip registered under this id
    #[error("Clip not found: {0}")]
    ClipNotFound(u32),

    /// No live instance under this id (never played, destroyed, or collected)
    #[error("Instance not found: {0}")]
    InstanceNotFound(u32),

    /// The clip has no keyframes and cannot be played
    #[error("Clip {0} has no keyframes")]
    EmptyClip(u32),

    /// An argument was out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for clip operations
pub type Result<T> = std::result::Result<T, AnimationError>;
