//! reelstack-server: HTTP service for the reelstack video platform
//!
//! Exposes account registration/login, signed upload authorizations for the
//! third-party media host, and video metadata listing/creation. All data
//! routes share one lazily established database connection per process,
//! owned by [`db::ConnectionCache`].

pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use state::AppState;
