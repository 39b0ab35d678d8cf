//! Application state shared across handlers

use std::sync::Arc;

use reelstack_core::auth::SessionSigner;
use reelstack_core::upload::UploadSigner;
use reelstack_core::AppConfig;

use crate::db::{ConnectionCache, PgConnector};

/// Shared application state
///
/// Cheap to clone; everything lives behind one `Arc`. The connection cache
/// is owned here — constructed once, injected into the router — rather than
/// looked up through any process global.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: ConnectionCache<PgConnector>,
    sessions: SessionSigner,
    uploads: UploadSigner,
}

impl AppState {
    pub fn new(
        db: ConnectionCache<PgConnector>,
        sessions: SessionSigner,
        uploads: UploadSigner,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                sessions,
                uploads,
            }),
        }
    }

    /// Wire up all collaborators from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ConnectionCache::from_config(config),
            SessionSigner::new(config.session_secret.clone(), config.session_ttl_secs),
            UploadSigner::new(
                config.upload_public_key.clone(),
                config.upload_private_key.clone(),
                config.upload_auth_ttl_secs,
            ),
        )
    }

    pub fn db(&self) -> &ConnectionCache<PgConnector> {
        &self.inner.db
    }

    pub fn sessions(&self) -> &SessionSigner {
        &self.inner.sessions
    }

    pub fn uploads(&self) -> &UploadSigner {
        &self.inner.uploads
    }
}
