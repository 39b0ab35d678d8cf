//! Custom Axum extractors

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use super::error::ApiError;
use crate::state::AppState;

/// The authenticated account, extracted from a bearer session token.
///
/// Adding this parameter to a handler makes the route require a valid,
/// unexpired session; rejection is a 401 before the handler body runs.
#[derive(Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized {
                reason: "missing authorization header".into(),
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized {
                reason: "authorization header is not a bearer token".into(),
            })?;

        let claims = state.sessions().verify(token)?;
        Ok(Self {
            id: claims.sub,
            email: claims.email,
        })
    }
}
