//! Upload authorization endpoint
//!
//! Hands the browser a short-lived signed credential for the media host;
//! the upload itself goes directly from the browser to the host.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use reelstack_core::upload::UploadAuthorization;

use crate::http::error::ApiError;
use crate::state::AppState;

/// GET /api/media/upload-auth - issue a signed upload authorization
async fn upload_auth(State(state): State<AppState>) -> Result<Json<UploadAuthorization>, ApiError> {
    let authorization = state.uploads().authorize()?;
    Ok(Json(authorization))
}

/// Media routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/media/upload-auth", get(upload_auth))
}
