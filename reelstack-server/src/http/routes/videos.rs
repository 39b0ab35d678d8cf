//! Video metadata endpoints

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{NewVideo, Video};
use crate::db::VideoRepo;
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::models::{
    MediaUrl, Paginated, Pagination, PaginationParams, ValidationError, VideoDescription,
    VideoTitle, DEFAULT_TRANSFORM_HEIGHT, DEFAULT_TRANSFORM_WIDTH,
};
use crate::state::AppState;

const DEFAULT_QUALITY: i32 = 100;

/// Create video request
#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    /// Show player controls; defaults to true
    pub controls: Option<bool>,
    /// Playback quality, 1-100; defaults to 100
    pub quality: Option<i32>,
}

/// Playback transformation applied by the media host
#[derive(Serialize)]
pub struct TransformationResponse {
    pub height: i32,
    pub width: i32,
    pub quality: i32,
}

/// Video response
#[derive(Serialize)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub controls: bool,
    pub transformation: TransformationResponse,
    pub created_at: String,
}

impl From<Video> for VideoResponse {
    fn from(v: Video) -> Self {
        Self {
            id: v.id,
            title: v.title,
            description: v.description,
            video_url: v.video_url,
            thumbnail_url: v.thumbnail_url,
            controls: v.controls,
            transformation: TransformationResponse {
                height: v.transform_height,
                width: v.transform_width,
                quality: v.transform_quality,
            },
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

impl CreateVideoRequest {
    fn validate(self) -> Result<NewVideo, ValidationError> {
        let quality = self.quality.unwrap_or(DEFAULT_QUALITY);
        if !(1..=100).contains(&quality) {
            return Err(ValidationError::InvalidFormat {
                field: "quality",
                reason: "must be between 1 and 100",
            });
        }

        Ok(NewVideo {
            title: VideoTitle::new(&self.title)?,
            description: VideoDescription::new(&self.description)?,
            video_url: MediaUrl::new("video_url", &self.video_url)?,
            thumbnail_url: MediaUrl::new("thumbnail_url", &self.thumbnail_url)?,
            controls: self.controls.unwrap_or(true),
            transform_height: DEFAULT_TRANSFORM_HEIGHT,
            transform_width: DEFAULT_TRANSFORM_WIDTH,
            transform_quality: quality,
        })
    }
}

/// GET /api/videos - list videos, newest first
async fn list_videos(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<VideoResponse>>, ApiError> {
    let page = Pagination::from(params);

    let pool = state.db().acquire().await?;
    let listed = VideoRepo::new(&pool).list(page).await?;

    Ok(Json(listed.map(VideoResponse::from)))
}

/// POST /api/videos - publish video metadata (requires a session)
async fn create_video(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), ApiError> {
    let new = req.validate()?;

    tracing::info!(user = %user.email, title = %new.title.as_str(), "publishing video");

    let pool = state.db().acquire().await?;
    let video = VideoRepo::new(&pool).create(new).await?;

    Ok((StatusCode::CREATED, Json(VideoResponse::from(video))))
}

/// Video routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/videos", get(list_videos).post(create_video))
}
