/// Persistence layer
///
/// The trending core talks to storage through two narrow traits so that the
/// ranking logic never performs read-modify-write on counters at the
/// application layer; every mutation is a single atomic store operation.
pub mod post_repo;
pub mod stat_repo;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{EngagementStat, Post};

pub use post_repo::PgPostStore;
pub use stat_repo::{PgStatStore, StatPriors};

/// Read-only access to blog posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>>;
    /// Posts whose effective publication time falls within [start, end].
    async fn find_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Post>>;
    async fn find_all(&self) -> Result<Vec<Post>>;
}

/// Durable per-post engagement statistics.
///
/// Every mutating operation is create-if-absent-then-increment in a single
/// atomic step: two concurrent first events on an unseen post must yield
/// exactly one record with both increments applied.
#[async_trait]
pub trait StatStore: Send + Sync {
    /// Increment `impressions` by one, creating the record with prior
    /// defaults if absent.
    async fn record_impression(&self, post: &Post, words: i64, now: DateTime<Utc>) -> Result<()>;

    /// Increment `clicks` by one, creating the record if absent. Clicks are
    /// a neutral signal: alpha and engaged_count are untouched.
    async fn record_click(&self, post: &Post, words: i64, now: DateTime<Utc>) -> Result<()>;

    /// Apply a read outcome: alpha+1 and engaged_count+1 when engaged,
    /// beta+1 otherwise. Creates the record with the outcome folded into
    /// the priors if absent.
    async fn record_read_end(
        &self,
        post: &Post,
        words: i64,
        engaged: bool,
        now: DateTime<Utc>,
    ) -> Result<()>;

    async fn get(&self, post_id: Uuid) -> Result<Option<EngagementStat>>;

    async fn get_many(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, EngagementStat>>;

    /// Multiply all accumulated statistics by `factor`, clamping alpha and
    /// beta at `floor` so the Beta distribution never degenerates. Returns
    /// the number of records touched.
    async fn decay_all(&self, factor: f64, floor: f64, now: DateTime<Utc>) -> Result<u64>;
}
