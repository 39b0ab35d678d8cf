//! reelstack-core: shared foundations for the reelstack video service
//!
//! This crate holds everything the server and CLI both need but that does not
//! touch HTTP or the database:
//! - Process-wide configuration loaded from the environment
//! - Password hashing and verification (argon2)
//! - Signed session tokens with expiry
//! - Signed upload authorizations for the third-party media host

pub mod auth;
pub mod config;
pub mod error;
pub mod upload;

pub use config::AppConfig;
pub use error::{CoreError, Result};
