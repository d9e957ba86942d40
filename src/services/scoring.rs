/// Scoring Engine
///
/// Thompson Sampling score per post: one fresh draw from the post's Beta
/// belief, nudged by a strictly capped click signal, a freshness boost for
/// recent publications, and a tiny jitter for tie-breaking. Scores only
/// order candidates relative to each other; the absolute value carries no
/// meaning.
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::config::TrendingConfig;
use crate::models::{EngagementStat, Post};
use crate::services::sampler::beta_sample;

/// A candidate post with its sampled ranking score.
#[derive(Debug, Clone)]
pub struct ScoredPost {
    pub post: Post,
    pub score: f64,
}

pub struct ScoringEngine {
    cfg: TrendingConfig,
}

impl ScoringEngine {
    pub fn new(cfg: TrendingConfig) -> Self {
        Self { cfg }
    }

    /// score = theta * weak_click_boost * fresh_boost * jitter
    pub fn score<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        post: &Post,
        stat: &EngagementStat,
        now: DateTime<Utc>,
    ) -> f64 {
        let alpha = if stat.alpha > 0.0 { stat.alpha } else { self.cfg.alpha0 };
        let beta = if stat.beta > 0.0 { stat.beta } else { self.cfg.beta0 };

        let theta = beta_sample(rng, alpha, beta);
        let boost = self.weak_click_boost(stat);
        let fresh = if post.is_fresh(now, self.cfg.fresh_hours) {
            self.cfg.fresh_multiplier
        } else {
            1.0
        };
        let jitter = 1.0 + rng.gen::<f64>() * self.cfg.jitter;

        theta * boost * fresh * jitter
    }

    /// Clicks are a weaker, more gameable signal than completed reads, so
    /// their influence is a small multiplicative nudge with a hard cap.
    fn weak_click_boost(&self, stat: &EngagementStat) -> f64 {
        if stat.clicks <= 0.0 || stat.impressions <= 0.0 {
            return 1.0;
        }

        let ctr = stat.clicks / stat.impressions;
        let ctr_part = (ctr * self.cfg.ctr_boost_cap).min(self.cfg.ctr_boost_cap);
        let qty_part = (stat.clicks.ln_1p() * 0.01).min(self.cfg.volume_boost_cap);

        1.0 + (ctr_part + qty_part).min(self.cfg.weak_click_cap)
    }
}
