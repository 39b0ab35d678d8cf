//! Signed upload authorizations for the third-party media host
//!
//! The browser uploads media bytes directly to the host; this service only
//! hands out a short-lived authorization the host will accept. The host's
//! scheme: a one-time token, an expiry in unix seconds, and
//! `hex(hmac_sha1(private_key, token + expire))` over the two.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;
use uuid::Uuid;

use crate::error::{CoreError, Result};

type HmacSha1 = Hmac<Sha1>;

/// A short-lived credential the client presents to the media host
#[derive(Debug, Clone, Serialize)]
pub struct UploadAuthorization {
    /// One-time request token
    pub token: String,
    /// Expiry, unix seconds
    pub expire: i64,
    /// Signature over token + expire
    pub signature: String,
    /// Public API key identifying this service's account with the host
    pub public_key: String,
}

/// Issues upload authorizations
#[derive(Clone)]
pub struct UploadSigner {
    public_key: String,
    private_key: String,
    ttl_secs: i64,
}

impl UploadSigner {
    pub fn new(
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        ttl_secs: i64,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            ttl_secs,
        }
    }

    /// Issue a fresh authorization.
    pub fn authorize(&self) -> Result<UploadAuthorization> {
        let token = Uuid::new_v4().to_string();
        let expire = Utc::now().timestamp() + self.ttl_secs;

        let mut mac = HmacSha1::new_from_slice(self.private_key.as_bytes())
            .map_err(|_| CoreError::signing("failed to initialize upload signature key"))?;
        mac.update(token.as_bytes());
        mac.update(expire.to_string().as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(UploadAuthorization {
            token,
            expire,
            signature,
            public_key: self.public_key.clone(),
        })
    }
}
