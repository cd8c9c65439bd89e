//! Error types for the Galaxy3D transient allocator
//!
//! This module defines the error types used by the transient resource system,
//! the allocator sessions and the engine service registry.

use std::fmt;

/// Result type for Galaxy3D operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (poisoned lock, platform collaborator failure, etc.)
    BackendError(String),

    /// A heap sized for the request could not place it
    OutOfMemory,

    /// Invalid resource (stale handle, handle from another session, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, resource system, configuration)
    InitializationFailed(String),

    /// Requested transient allocation is larger than the maximum heap size
    ///
    /// This is a recoverable condition: the caller may fall back to a
    /// persistent allocation.
    AllocationTooLarge {
        /// Requested size in bytes
        size: u64,
        /// Configured maximum heap size in bytes
        max_heap_size: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of transient heap memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::AllocationTooLarge { size, max_heap_size } => write!(
                f,
                "Allocation too large: {} bytes requested, maximum heap size is {} bytes",
                size, max_heap_size
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
