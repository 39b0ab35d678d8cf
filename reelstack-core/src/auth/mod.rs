//! Account credentials: password hashing and signed session tokens

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password};
pub use session::{SessionClaims, SessionSigner, SessionToken};

use thiserror::Error;

/// Errors from credential handling
#[derive(Error, Debug)]
pub enum AuthError {
    /// Hashing a password failed
    #[error("failed to hash password: {reason}")]
    Hash { reason: String },

    /// Identifier/secret pair did not match a stored credential
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Token is not in payload.signature form
    #[error("malformed session token")]
    TokenMalformed,

    /// Token signature did not verify
    #[error("session token signature mismatch")]
    TokenSignature,

    /// Token was valid but past its expiry
    #[error("session token expired")]
    TokenExpired,

    /// Claims could not be encoded into a token
    #[error("failed to encode session token: {reason}")]
    TokenEncoding { reason: String },
}
