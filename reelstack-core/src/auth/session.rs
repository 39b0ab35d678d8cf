//! Signed session tokens
//!
//! A token is `base64url(claims json) . base64url(hmac_sha256(payload))`,
//! keyed by the process-wide session secret. The token is opaque to clients;
//! the server verifies the signature before trusting any claim in it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried inside a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account id
    pub sub: Uuid,
    /// Account email, denormalized for display without a store round-trip
    pub email: String,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// A freshly issued token plus its expiry, for the login response
#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates signed session tokens
#[derive(Clone)]
pub struct SessionSigner {
    secret: String,
    ttl_secs: i64,
}

impl SessionSigner {
    pub fn new(secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    /// Issue a token for an authenticated account.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<SessionToken, AuthError> {
        let expires_at = Utc::now() + chrono::Duration::seconds(self.ttl_secs);
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_owned(),
            exp: expires_at.timestamp(),
        };

        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims).map_err(|e| AuthError::TokenEncoding {
                reason: e.to_string(),
            })?,
        );
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes())?);

        Ok(SessionToken {
            token: format!("{payload}.{signature}"),
            expires_at,
        })
    }

    /// Verify a token and return its claims.
    ///
    /// Rejects tokens that are malformed, carry a bad signature, or are past
    /// expiry. The signature is checked before the payload is parsed, so an
    /// attacker-controlled payload is never deserialized.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::TokenMalformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::TokenMalformed)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::TokenSignature)?;

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::TokenMalformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&claims_bytes).map_err(|_| AuthError::TokenMalformed)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, AuthError> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| AuthError::TokenEncoding {
            reason: "failed to initialize session key".into(),
        })
    }
}
