//! Database layer - connection cache, schema setup, and repositories
//!
//! # Design Principles
//!
//! - One lazily established connection per process, shared by every caller
//!   (see [`cache::ConnectionCache`]) - no per-request connects
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - List queries carry their total via a window function - no second count query

pub mod cache;
pub mod migrations;
pub mod repos;

pub use cache::{ConnectionCache, Connector, DbError, PgConnector};
pub use repos::{RepoError, UserRepo, VideoRepo};
