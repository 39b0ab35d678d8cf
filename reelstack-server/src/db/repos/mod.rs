//! Repository implementations for database access
//!
//! Each repository borrows the shared pool and follows these patterns:
//! - Unique conflicts surface as typed errors via DB constraints
//!   (no check-then-insert)
//! - List operations fetch their total with `COUNT(*) OVER()`

pub mod users;
pub mod videos;

pub use users::{User, UserRepo};
pub use videos::{NewVideo, Video, VideoRepo};

use thiserror::Error;

/// Errors from repository operations
#[derive(Error, Debug)]
pub enum RepoError {
    /// Query execution failed
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// Insert hit the unique email constraint
    #[error("email is already registered")]
    EmailTaken,
}
