/// Trending Service
///
/// Orchestrates the trending pipeline: resolves post references, routes
/// engagement events through the classifier into the stat store, and
/// assembles the ranked top-K list from fresh Thompson draws. Scoring is
/// read-only; all mutation happens inside the stat store's atomic upserts.
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::config::TrendingConfig;
use crate::db::{PostStore, StatStore};
use crate::error::{AppError, Result};
use crate::events::{EngagementEvent, EngagementKind, EventPublisher};
use crate::models::{EngagementStat, Post, PostRef, ReadEvent};
use crate::services::classifier;
use crate::services::scoring::{ScoredPost, ScoringEngine};
use crate::services::selection::select_top_k;

/// Result of a read-end submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadEndOutcome {
    /// Discarded by the bot filter; no stat was touched.
    Ignored,
    Recorded { engaged: bool, ratio: f64 },
}

pub struct TrendingService {
    posts: Arc<dyn PostStore>,
    stats: Arc<dyn StatStore>,
    scoring: ScoringEngine,
    events: EventPublisher,
    cfg: TrendingConfig,
}

impl TrendingService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        stats: Arc<dyn StatStore>,
        events: EventPublisher,
        cfg: TrendingConfig,
    ) -> Self {
        Self {
            posts,
            stats,
            scoring: ScoringEngine::new(cfg.clone()),
            events,
            cfg,
        }
    }

    /// Resolve a caller-supplied reference to a concrete post. Events are
    /// never recorded against unresolvable references, so orphan stats
    /// cannot be created.
    async fn resolve(&self, post_ref: &PostRef) -> Result<Post> {
        let post = match post_ref {
            PostRef::Id(id) => self.posts.find_by_id(*id).await?,
            PostRef::Slug(slug) => self.posts.find_by_slug(slug).await?,
        };

        post.ok_or_else(|| AppError::NotFound(format!("no post for reference '{}'", post_ref)))
    }

    fn words_for(post: &Post) -> i64 {
        match post.words {
            Some(words) if words > 0 => i64::from(words).max(50),
            _ => classifier::word_count(&post.content),
        }
    }

    /// Ordered trending list. `limit` is clamped to [1, max_limit];
    /// `window_days` only applies when `include_all` is false.
    pub async fn get_trending(
        &self,
        limit: usize,
        window_days: Option<i64>,
        include_all: bool,
    ) -> Result<Vec<Post>> {
        let now = Utc::now();
        let limit = limit.clamp(1, self.cfg.max_limit);

        let candidates = if include_all {
            self.posts.find_all().await?
        } else {
            let days = window_days.unwrap_or(self.cfg.default_window_days).max(1);
            let start = now - Duration::days(days);
            self.posts.find_in_window(start, now).await?
        };

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<_> = candidates.iter().map(|p| p.id).collect();
        let stats = self.stats.get_many(&ids).await?;

        debug!(
            candidates = candidates.len(),
            with_stats = stats.len(),
            limit,
            "Scoring trending candidates"
        );

        // One fresh bandit draw per candidate per request. Posts without a
        // stat row score against a synthetic prior-only stat.
        let mut rng = rand::thread_rng();
        let scored: Vec<ScoredPost> = candidates
            .into_iter()
            .map(|post| {
                let words = Self::words_for(&post);
                let score = match stats.get(&post.id) {
                    Some(stat) => self.scoring.score(&mut rng, &post, stat, now),
                    None => {
                        let synthetic = EngagementStat::synthetic(&post, words, &self.cfg, now);
                        self.scoring.score(&mut rng, &post, &synthetic, now)
                    }
                };
                ScoredPost { post, score }
            })
            .collect();

        Ok(select_top_k(scored, limit, now, self.cfg.fresh_hours))
    }

    pub async fn record_impression(&self, post_ref: &PostRef) -> Result<()> {
        let post = self.resolve(post_ref).await?;
        let words = Self::words_for(&post);

        self.stats.record_impression(&post, words, Utc::now()).await?;
        self.events
            .publish(EngagementEvent::new(post.id, EngagementKind::Impression, None));
        Ok(())
    }

    pub async fn record_click(&self, post_ref: &PostRef) -> Result<()> {
        let post = self.resolve(post_ref).await?;
        let words = Self::words_for(&post);

        self.stats.record_click(&post, words, Utc::now()).await?;
        self.events
            .publish(EngagementEvent::new(post.id, EngagementKind::Click, None));
        Ok(())
    }

    pub async fn record_read_end(
        &self,
        post_ref: &PostRef,
        event: &ReadEvent,
    ) -> Result<ReadEndOutcome> {
        let post = self.resolve(post_ref).await?;

        if classifier::is_bot_like(event.dwell_ms, event.scroll_depth) {
            debug!(post_id = %post.id, dwell_ms = ?event.dwell_ms, "Discarding bot-like read event");
            return Ok(ReadEndOutcome::Ignored);
        }

        let words = Self::words_for(&post);
        let decision = classifier::classify_engagement(event, words);

        self.stats
            .record_read_end(&post, words, decision.engaged, Utc::now())
            .await?;
        self.events.publish(EngagementEvent::new(
            post.id,
            EngagementKind::ReadEnd,
            Some(decision.engaged),
        ));

        Ok(ReadEndOutcome::Recorded {
            engaged: decision.engaged,
            ratio: decision.ratio,
        })
    }

    pub fn config(&self) -> &TrendingConfig {
        &self.cfg
    }
}
