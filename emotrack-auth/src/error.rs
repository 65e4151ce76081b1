//! Error types for emotrack-auth
//!
//! All fallible operations return `Result<T, AuthError>`.
//! No panics, no unwraps in production code paths.

use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Unified error type for token and credential handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ─── Credential Errors ───

    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Credential expired")]
    ExpiredCredential,

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("No credential supplied")]
    MissingCredential,

    // ─── Startup Errors ───

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether a cookie carrying the failed credential should be cleared.
    ///
    /// A credential that was present but unusable will never become usable,
    /// so the client is told to drop it. An absent credential leaves nothing
    /// to clear.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Self::MalformedCredential(_)
                | Self::InvalidSignature
                | Self::ExpiredCredential
                | Self::InvalidIdentity(_)
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingAlgorithm => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
            _ => AuthError::MalformedCredential(err.to_string()),
        }
    }
}

/// Result type alias for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;
