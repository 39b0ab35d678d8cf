//! Video metadata repository
//!
//! Stores pointers into the media host (playback and thumbnail addresses)
//! plus display options; the media bytes themselves never touch this system.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use super::RepoError;
use crate::models::{MediaUrl, Paginated, Pagination, VideoDescription, VideoTitle};

/// Video record from database
#[derive(Debug, Clone, FromRow)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub controls: bool,
    pub transform_height: i32,
    pub transform_width: i32,
    pub transform_quality: i32,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a video record
#[derive(Debug)]
pub struct NewVideo {
    pub title: VideoTitle,
    pub description: VideoDescription,
    pub video_url: MediaUrl,
    pub thumbnail_url: MediaUrl,
    pub controls: bool,
    pub transform_height: i32,
    pub transform_width: i32,
    pub transform_quality: i32,
}

/// Video repository
pub struct VideoRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> VideoRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List videos, newest first.
    pub async fn list(&self, page: Pagination) -> Result<Paginated<Video>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                title,
                description,
                video_url,
                thumbnail_url,
                controls,
                transform_height,
                transform_width,
                transform_quality,
                created_at,
                COUNT(*) OVER() as total
            FROM videos
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .into_iter()
            .map(|r| Video {
                id: r.get("id"),
                title: r.get("title"),
                description: r.get("description"),
                video_url: r.get("video_url"),
                thumbnail_url: r.get("thumbnail_url"),
                controls: r.get("controls"),
                transform_height: r.get("transform_height"),
                transform_width: r.get("transform_width"),
                transform_quality: r.get("transform_quality"),
                created_at: r.get("created_at"),
            })
            .collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Create a video record.
    pub async fn create(&self, new: NewVideo) -> Result<Video, RepoError> {
        let video = sqlx::query_as(
            r#"
            INSERT INTO videos (
                title, description, video_url, thumbnail_url,
                controls, transform_height, transform_width, transform_quality
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id, title, description, video_url, thumbnail_url,
                controls, transform_height, transform_width, transform_quality,
                created_at
            "#,
        )
        .bind(new.title.as_str())
        .bind(new.description.as_str())
        .bind(new.video_url.as_str())
        .bind(new.thumbnail_url.as_str())
        .bind(new.controls)
        .bind(new.transform_height)
        .bind(new.transform_width)
        .bind(new.transform_quality)
        .fetch_one(self.pool)
        .await?;

        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_TRANSFORM_HEIGHT, DEFAULT_TRANSFORM_WIDTH};

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPool::connect(&url).await.expect("connect failed");
        crate::db::migrations::ensure_schema(&pool)
            .await
            .expect("schema setup failed");
        pool
    }

    fn sample(title: &str) -> NewVideo {
        NewVideo {
            title: VideoTitle::new(title).unwrap(),
            description: VideoDescription::new("a test clip").unwrap(),
            video_url: MediaUrl::new("video_url", "https://media.example/v.mp4").unwrap(),
            thumbnail_url: MediaUrl::new("thumbnail_url", "https://media.example/t.jpg").unwrap(),
            controls: true,
            transform_height: DEFAULT_TRANSFORM_HEIGHT,
            transform_width: DEFAULT_TRANSFORM_WIDTH,
            transform_quality: 100,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_then_list_newest_first() {
        let pool = pool().await;
        let repo = VideoRepo::new(&pool);

        let older = repo.create(sample("older")).await.unwrap();
        let newer = repo.create(sample("newer")).await.unwrap();

        let listed = repo.list(Pagination::default()).await.unwrap();
        let older_pos = listed.items.iter().position(|v| v.id == older.id);
        let newer_pos = listed.items.iter().position(|v| v.id == newer.id);

        match (newer_pos, older_pos) {
            (Some(n), Some(o)) => assert!(n < o, "newest must come first"),
            _ => panic!("both inserted videos should be on the first page"),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn list_reports_total_across_pages() {
        let pool = pool().await;
        let repo = VideoRepo::new(&pool);

        for i in 0..3 {
            repo.create(sample(&format!("clip {i}"))).await.unwrap();
        }

        let page = repo.list(Pagination::new(1, 2)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.total >= 3);
    }
}
