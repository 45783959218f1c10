//! Common error types for the AgroGuard backend
//!
//! Store backends report failures through a closed kind enum so callers can
//! switch on the kind rather than matching on message text. In particular
//! `AuthorizationDenied` is the one variant the failover repository reacts
//! to; everything else degrades to an empty result at that layer.

use thiserror::Error;

/// Common result type for AgroGuard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the AgroGuard backend
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound HTTP failure (fallback REST service, vision API)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend refused the operation for this caller
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the backend structurally refuses this caller, which is the
    /// only condition under which the failover repository switches backends.
    pub fn is_authorization_denied(&self) -> bool {
        matches!(self, Error::AuthorizationDenied(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_denied_is_distinguishable() {
        assert!(Error::AuthorizationDenied("writes blocked".into()).is_authorization_denied());
        assert!(!Error::NotFound("diseases/x".into()).is_authorization_denied());
        assert!(!Error::Http("connection refused".into()).is_authorization_denied());
    }

    #[test]
    fn display_includes_detail() {
        let err = Error::InvalidInput("name is required".to_string());
        assert_eq!(err.to_string(), "Invalid input: name is required");
    }
}
