//! Account endpoints: registration and login

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reelstack_core::auth::{self, AuthError};

use crate::db::UserRepo;
use crate::http::error::ApiError;
use crate::models::{Email, Password};
use crate::state::AppState;

/// Fixed delay on a failed login, blunting timing probes against
/// the account namespace.
const FAILED_LOGIN_DELAY: Duration = Duration::from_millis(100);

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the bearer token and when it stops working
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/auth/register - create an account
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = Email::new(&req.email)?;
    let password = Password::new(&req.password)?;

    let password_hash = auth::hash_password(password.as_str())?;

    let pool = state.db().acquire().await?;
    let user = UserRepo::new(&pool).create(&email, &password_hash).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

/// POST /api/auth/login - exchange credentials for a session token
///
/// Unknown email and wrong password produce the same response, so the
/// endpoint cannot be used to enumerate accounts.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = Email::new(&req.email)?;
    let password = Password::new(&req.password)?;

    let pool = state.db().acquire().await?;
    let user = UserRepo::new(&pool).find_by_email(email.as_str()).await?;

    match user {
        Some(user) if auth::verify_password(password.as_str(), &user.password_hash) => {
            let session = state.sessions().issue(user.id, &user.email)?;
            Ok(Json(LoginResponse {
                token: session.token,
                expires_at: session.expires_at,
            }))
        }
        _ => {
            tokio::time::sleep(FAILED_LOGIN_DELAY).await;
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

/// Account routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}
