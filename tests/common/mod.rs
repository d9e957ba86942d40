//! In-memory store implementations for integration tests.
//!
//! `InMemoryStatStore` mirrors the atomicity contract of the Postgres store:
//! every mutation is a single create-or-increment step on a concurrent map
//! entry, so concurrent first events on an unseen post produce exactly one
//! record with all increments applied.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use trending_service::db::{PostStore, StatPriors, StatStore};
use trending_service::error::Result;
use trending_service::models::{EngagementStat, Post};

pub fn make_post(slug: &str, category: &str, published_at: DateTime<Utc>) -> Post {
    Post {
        id: Uuid::new_v4(),
        slug: Some(slug.to_string()),
        title: format!("Post {}", slug),
        content: "word ".repeat(400),
        category: Some(category.to_string()),
        words: Some(400),
        published_at: Some(published_at),
        created_at: published_at,
    }
}

pub fn hours_ago(h: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(h)
}

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Vec<Post>,
}

impl InMemoryPostStore {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        Ok(self
            .posts
            .iter()
            .find(|p| p.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn find_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .iter()
            .filter(|p| {
                let t = p.publish_time();
                t >= start && t <= end
            })
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        Ok(self.posts.clone())
    }
}

pub struct InMemoryStatStore {
    stats: DashMap<Uuid, EngagementStat>,
    priors: StatPriors,
}

impl InMemoryStatStore {
    pub fn new(priors: StatPriors) -> Self {
        Self {
            stats: DashMap::new(),
            priors,
        }
    }

    fn fresh_stat(&self, post: &Post, words: i64, now: DateTime<Utc>) -> EngagementStat {
        EngagementStat {
            post_id: post.id,
            alpha: self.priors.alpha0,
            beta: self.priors.beta0,
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

#[async_trait]
impl StatStore for InMemoryStatStore {
    async fn record_impression(&self, post: &Post, words: i64, now: DateTime<Utc>) -> Result<()> {
        self.stats
            .entry(post.id)
            .and_modify(|s| {
                s.impressions += 1.0;
                s.last_updated = now;
            })
            .or_insert_with(|| {
                let mut s = self.fresh_stat(post, words, now);
                s.impressions = 1.0;
                s
            });
        Ok(())
    }

    async fn record_click(&self, post: &Post, words: i64, now: DateTime<Utc>) -> Result<()> {
        self.stats
            .entry(post.id)
            .and_modify(|s| {
                s.clicks += 1.0;
                s.last_updated = now;
            })
            .or_insert_with(|| {
                let mut s = self.fresh_stat(post, words, now);
                s.clicks = 1.0;
                s
            });
        Ok(())
    }

    async fn record_read_end(
        &self,
        post: &Post,
        words: i64,
        engaged: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (alpha_inc, beta_inc, engaged_inc) = if engaged {
            (1.0, 0.0, 1.0)
        } else {
            (0.0, 1.0, 0.0)
        };

        self.stats
            .entry(post.id)
            .and_modify(|s| {
                s.alpha += alpha_inc;
                s.beta += beta_inc;
                s.engaged_count += engaged_inc;
                s.last_updated = now;
            })
            .or_insert_with(|| {
                let mut s = self.fresh_stat(post, words, now);
                s.alpha += alpha_inc;
                s.beta += beta_inc;
                s.engaged_count += engaged_inc;
                s
            });
        Ok(())
    }

    async fn get(&self, post_id: Uuid) -> Result<Option<EngagementStat>> {
        Ok(self.stats.get(&post_id).map(|s| s.clone()))
    }

    async fn get_many(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, EngagementStat>> {
        Ok(post_ids
            .iter()
            .filter_map(|id| self.stats.get(id).map(|s| (*id, s.clone())))
            .collect())
    }

    async fn decay_all(&self, factor: f64, floor: f64, now: DateTime<Utc>) -> Result<u64> {
        let mut rows = 0;
        for mut entry in self.stats.iter_mut() {
            let s = entry.value_mut();
            s.alpha = (s.alpha * factor).max(floor);
            s.beta = (s.beta * factor).max(floor);
            s.impressions *= factor;
            s.clicks *= factor;
            s.engaged_count *= factor;
            s.last_updated = now;
            rows += 1;
        }
        Ok(rows)
    }
}
