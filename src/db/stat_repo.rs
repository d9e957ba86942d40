/// Postgres-backed engagement stat store
///
/// All mutations are single `INSERT ... ON CONFLICT ... DO UPDATE`
/// statements keyed on `post_id`, so create-if-absent and increment happen
/// atomically under concurrent writers. The row is created with the Beta
/// priors and the triggering event already applied.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::db::StatStore;
use crate::error::{AppError, Result};
use crate::models::{EngagementStat, Post};

const STAT_COLUMNS: &str = "post_id, alpha, beta, impressions, clicks, engaged_count, \
                            words, category, published_at, last_updated";

/// Beta prior parameters applied when a stat row is first created.
#[derive(Debug, Clone, Copy)]
pub struct StatPriors {
    pub alpha0: f64,
    pub beta0: f64,
}

pub struct PgStatStore {
    pool: PgPool,
    priors: StatPriors,
}

impl PgStatStore {
    pub fn new(pool: PgPool, priors: StatPriors) -> Self {
        Self { pool, priors }
    }
}

#[async_trait]
impl StatStore for PgStatStore {
    async fn record_impression(&self, post: &Post, words: i64, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO engagement_stats
                (post_id, alpha, beta, impressions, clicks, engaged_count,
                 words, category, published_at, last_updated)
            VALUES ($1, $2, $3, 1, 0, 0, $4, $5, $6, $7)
            ON CONFLICT (post_id) DO UPDATE
            SET impressions = engagement_stats.impressions + 1,
                last_updated = $7
            "#,
        )
        .bind(post.id)
        .bind(self.priors.alpha0)
        .bind(self.priors.beta0)
        .bind(words)
        .bind(&post.category)
        .bind(post.publish_time())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(post_id = %post.id, error = %e, "Failed to record impression");
            AppError::Database(e.to_string())
        })?;

        Ok(())
    }

    async fn record_click(&self, post: &Post, words: i64, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO engagement_stats
                (post_id, alpha, beta, impressions, clicks, engaged_count,
                 words, category, published_at, last_updated)
            VALUES ($1, $2, $3, 0, 1, 0, $4, $5, $6, $7)
            ON CONFLICT (post_id) DO UPDATE
            SET clicks = engagement_stats.clicks + 1,
                last_updated = $7
            "#,
        )
        .bind(post.id)
        .bind(self.priors.alpha0)
        .bind(self.priors.beta0)
        .bind(words)
        .bind(&post.category)
        .bind(post.publish_time())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(post_id = %post.id, error = %e, "Failed to record click");
            AppError::Database(e.to_string())
        })?;

        Ok(())
    }

    async fn record_read_end(
        &self,
        post: &Post,
        words: i64,
        engaged: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (alpha_inc, beta_inc, engaged_inc): (f64, f64, f64) = if engaged {
            (1.0, 0.0, 1.0)
        } else {
            (0.0, 1.0, 0.0)
        };

        sqlx::query(
            r#"
            INSERT INTO engagement_stats
                (post_id, alpha, beta, impressions, clicks, engaged_count,
                 words, category, published_at, last_updated)
            VALUES ($1, $2 + $3, $4 + $5, 0, 0, $6, $7, $8, $9, $10)
            ON CONFLICT (post_id) DO UPDATE
            SET alpha = engagement_stats.alpha + $3,
                beta = engagement_stats.beta + $5,
                engaged_count = engagement_stats.engaged_count + $6,
                last_updated = $10
            "#,
        )
        .bind(post.id)
        .bind(self.priors.alpha0)
        .bind(alpha_inc)
        .bind(self.priors.beta0)
        .bind(beta_inc)
        .bind(engaged_inc)
        .bind(words)
        .bind(&post.category)
        .bind(post.publish_time())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(post_id = %post.id, error = %e, "Failed to record read end");
            AppError::Database(e.to_string())
        })?;

        Ok(())
    }

    async fn get(&self, post_id: Uuid) -> Result<Option<EngagementStat>> {
        let stat = sqlx::query_as::<_, EngagementStat>(&format!(
            "SELECT {} FROM engagement_stats WHERE post_id = $1",
            STAT_COLUMNS
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(post_id = %post_id, error = %e, "Failed to fetch stat");
            AppError::Database(e.to_string())
        })?;

        Ok(stat)
    }

    async fn get_many(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, EngagementStat>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let stats = sqlx::query_as::<_, EngagementStat>(&format!(
            "SELECT {} FROM engagement_stats WHERE post_id = ANY($1)",
            STAT_COLUMNS
        ))
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch stats batch");
            AppError::Database(e.to_string())
        })?;

        Ok(stats.into_iter().map(|s| (s.post_id, s)).collect())
    }

    async fn decay_all(&self, factor: f64, floor: f64, now: DateTime<Utc>) -> Result<u64> {
        // alpha/beta are clamped at the floor; raw counters may shrink to
        // zero freely.
        let result = sqlx::query(
            r#"
            UPDATE engagement_stats
            SET alpha = GREATEST(alpha * $1, $2),
                beta = GREATEST(beta * $1, $2),
                impressions = impressions * $1,
                clicks = clicks * $1,
                engaged_count = engaged_count * $1,
                last_updated = $3
            "#,
        )
        .bind(factor)
        .bind(floor)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to apply decay");
            AppError::Database(e.to_string())
        })?;

        Ok(result.rows_affected())
    }
}
