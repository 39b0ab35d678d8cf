//! Process-wide configuration for the reelstack service
//!
//! All settings come from the environment and are read once per process.
//! `DATABASE_URL` is deliberately optional here: the database layer owns the
//! decision of when its absence becomes an error, so that a warm process can
//! report misconfiguration at first use instead of refusing to boot paths
//! that never touch the store.

use std::env;

use crate::error::{CoreError, Result};

/// Default session lifetime: 30 days.
const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Default upload-authorization lifetime: 1 hour.
const DEFAULT_UPLOAD_AUTH_TTL_SECS: i64 = 3600;

/// Centralized configuration for the reelstack service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Connection string for the backing store. Optional at load time;
    /// checked by the connection cache at first acquire.
    pub database_url: Option<String>,

    /// HMAC key for session tokens
    pub session_secret: String,

    /// Session token lifetime in seconds
    pub session_ttl_secs: i64,

    /// Public API key handed to upload clients
    pub upload_public_key: String,

    /// Private key used to sign upload authorizations
    pub upload_private_key: String,

    /// Upload authorization lifetime in seconds
    pub upload_auth_ttl_secs: i64,
}

impl AppConfig {
    /// Load config from the process environment.
    ///
    /// Fails with an actionable error naming the first missing or
    /// malformed variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load config through an arbitrary lookup function.
    ///
    /// `from_env` is a thin wrapper over this; tests supply their own lookup
    /// instead of mutating process-wide environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            session_secret: require(&lookup, "SESSION_SECRET")?,
            session_ttl_secs: parse_secs(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
            upload_public_key: require(&lookup, "UPLOAD_PUBLIC_KEY")?,
            upload_private_key: require(&lookup, "UPLOAD_PRIVATE_KEY")?,
            upload_auth_ttl_secs: parse_secs(
                &lookup,
                "UPLOAD_AUTH_TTL_SECS",
                DEFAULT_UPLOAD_AUTH_TTL_SECS,
            )?,
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::missing_env(key))
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: i64) -> Result<i64> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => {
            let secs: i64 = raw
                .parse()
                .map_err(|_| CoreError::invalid_env(key, format!("'{raw}' is not a number")))?;
            if secs <= 0 {
                return Err(CoreError::invalid_env(key, "must be positive"));
            }
            Ok(secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn minimal() -> HashMap<String, String> {
        env(&[
            ("SESSION_SECRET", "top-secret"),
            ("UPLOAD_PUBLIC_KEY", "pub_key"),
            ("UPLOAD_PRIVATE_KEY", "priv_key"),
        ])
    }

    #[test]
    fn loads_with_defaults() {
        let vars = minimal();
        let config = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.session_secret, "top-secret");
        assert_eq!(config.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
        assert_eq!(config.upload_auth_ttl_secs, DEFAULT_UPLOAD_AUTH_TTL_SECS);
    }

    #[test]
    fn missing_secret_fails() {
        let mut vars = minimal();
        vars.remove("SESSION_SECRET");

        let err = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, CoreError::MissingEnv { key } if key == "SESSION_SECRET"));
    }

    #[test]
    fn empty_database_url_treated_as_absent() {
        let mut vars = minimal();
        vars.insert("DATABASE_URL".into(), "".into());

        let config = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn bad_ttl_rejected() {
        let mut vars = minimal();
        vars.insert("SESSION_TTL_SECS".into(), "soon".into());

        let err = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidEnv { key, .. } if key == "SESSION_TTL_SECS"));

        vars.insert("SESSION_TTL_SECS".into(), "-5".into());
        let err = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidEnv { .. }));
    }

    #[test]
    fn ttl_override_applies() {
        let mut vars = minimal();
        vars.insert("SESSION_TTL_SECS".into(), "86400".into());

        let config = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.session_ttl_secs, 86_400);
    }
}
