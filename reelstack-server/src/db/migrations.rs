//! Schema setup
//!
//! Idempotent DDL, executed as part of connection establishment so a ready
//! connection always implies a usable schema.

use sqlx::PgPool;
use tracing::info;

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            video_url TEXT NOT NULL,
            thumbnail_url TEXT NOT NULL,
            controls BOOLEAN NOT NULL DEFAULT TRUE,
            transform_height INT NOT NULL DEFAULT 1920,
            transform_width INT NOT NULL DEFAULT 1080,
            transform_quality INT NOT NULL DEFAULT 100,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS videos_created_at_idx
            ON videos (created_at DESC);
    "#,
    )
    .execute(pool)
    .await?;

    info!("database schema ensured");
    Ok(())
}
