/// Structured error types for reelstack-core.
///
/// Uses `thiserror` for better API surface and error composition.
/// The binary crate (reelstack-cli) can still use `anyhow` for convenience,
/// but library consumers get structured, composable errors.
use thiserror::Error;

/// Main error type for reelstack-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Required environment variable missing
    #[error("Missing required environment variable '{key}'")]
    MissingEnv { key: String },

    /// Environment variable present but unusable
    #[error("Invalid value for environment variable '{key}': {reason}")]
    InvalidEnv { key: String, reason: String },

    /// Signing a credential failed
    #[error("Signing error: {reason}")]
    Signing { reason: String },
}

/// Result type alias for reelstack-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a missing-environment error
    pub fn missing_env(key: impl Into<String>) -> Self {
        Self::MissingEnv { key: key.into() }
    }

    /// Create an invalid-environment error
    pub fn invalid_env(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEnv {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a signing error
    pub fn signing(reason: impl Into<String>) -> Self {
        Self::Signing {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::missing_env("SESSION_SECRET");
        assert_eq!(
            err.to_string(),
            "Missing required environment variable 'SESSION_SECRET'"
        );

        let err = CoreError::invalid_env("SESSION_TTL_SECS", "not a number");
        assert!(err.to_string().contains("SESSION_TTL_SECS"));
        assert!(err.to_string().contains("not a number"));
    }
}
