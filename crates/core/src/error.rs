//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Raised by a store whose access rules reject the caller. Expected
    /// while shared-data rules are not yet active for an identity, and
    /// recovered by falling back to legacy mode.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Price fetch error: {0}")]
    PriceFetch(String),
}

impl Error {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}
