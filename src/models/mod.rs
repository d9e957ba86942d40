/// Data models for the trending service
///
/// - `Post`: blog post as seen by the ranker (read-only)
/// - `EngagementStat`: per-post bandit parameters and raw counters
/// - `PostRef`: typed post reference (id or slug)
/// - `ReadEvent`: payload of a read-completion signal
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TrendingConfig;

/// A blog post. The trending core only reads posts; CRUD lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub slug: Option<String>,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    /// Cached word count; derived from content when absent
    pub words: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Effective publication time: explicit publish date, else creation time.
    pub fn publish_time(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    /// Whether the post was published within `fresh_hours` of `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, fresh_hours: i64) -> bool {
        now.signed_duration_since(self.publish_time()) <= Duration::hours(fresh_hours)
    }
}

/// Per-post engagement statistics backing the Beta-Bernoulli model.
///
/// Counters are stored as reals because the decay job multiplies them by a
/// factor below one.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EngagementStat {
    pub post_id: Uuid,
    pub alpha: f64,
    pub beta: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub engaged_count: f64,
    pub words: i64,
    pub category: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl EngagementStat {
    /// In-memory stat for a post that has no row yet. Built from the priors
    /// and never persisted; persistence happens on the first event.
    pub fn synthetic(post: &Post, words: i64, cfg: &TrendingConfig, now: DateTime<Utc>) -> Self {
        Self {
            post_id: post.id,
            alpha: cfg.alpha0,
            beta: cfg.beta0,
            impressions: 0.0,
            clicks: 0.0,
            engaged_count: 0.0,
            words,
            category: post.category.clone(),
            published_at: Some(post.publish_time()),
            last_updated: now,
        }
    }
}

/// Typed post reference supplied by callers: a direct identifier or a slug.
///
/// A single parse attempt decides the variant; there is no pattern-based
/// identifier recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRef {
    Id(Uuid),
    Slug(String),
}

impl PostRef {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => PostRef::Id(id),
            Err(_) => PostRef::Slug(raw.to_string()),
        }
    }
}

impl std::fmt::Display for PostRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostRef::Id(id) => write!(f, "{}", id),
            PostRef::Slug(slug) => write!(f, "{}", slug),
        }
    }
}

/// Read-completion signal as reported by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadEvent {
    pub dwell_ms: Option<i64>,
    pub scroll_depth: Option<f64>,
    #[serde(default)]
    pub bookmarked: bool,
    #[serde(default)]
    pub shared: bool,
}
