/// Postgres-backed post repository (read-only for the trending core)
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::models::Post;

const POST_COLUMNS: &str =
    "id, slug, title, content, category, words, published_at, created_at";

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(post_id = %id, error = %e, "Failed to fetch post by id");
            AppError::Database(e.to_string())
        })?;

        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE slug = $1",
            POST_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(slug = %slug, error = %e, "Failed to fetch post by slug");
            AppError::Database(e.to_string())
        })?;

        Ok(post)
    }

    async fn find_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Post>> {
        // Posts without an explicit publish date fall back to created_at,
        // matching EngagementStat's notion of publication time.
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {}
            FROM posts
            WHERE COALESCE(published_at, created_at) BETWEEN $1 AND $2
            ORDER BY COALESCE(published_at, created_at) DESC
            "#,
            POST_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch posts in window");
            AppError::Database(e.to_string())
        })?;

        Ok(posts)
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts ORDER BY COALESCE(published_at, created_at) DESC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch all posts");
            AppError::Database(e.to_string())
        })?;

        Ok(posts)
    }
}
