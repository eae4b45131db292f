//! Error types for the state container.

use thiserror::Error;

/// Main error type for container operations.
///
/// All variants are raised synchronously during subscription validation,
/// before any registration side effect. `update` never produces these: a
/// misbehaving transform or subscriber panics at the call site unmodified.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    #[error("Invalid subscriber: not a callable")]
    InvalidSubscriber,

    #[error("Invalid selector: not a callable")]
    InvalidSelector,

    #[error("Invalid equality policy: not a callable")]
    InvalidEqualityPolicy,
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
