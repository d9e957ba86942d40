//! Statistical Decay Background Job
//!
//! Once per cycle (daily by default) every engagement stat is multiplied by
//! the decay factor, shrinking accumulated evidence toward the prior. This
//! keeps the Beta posteriors from collapsing: without decay, alpha/beta grow
//! without bound and Thompson Sampling stops exploring, letting old hits
//! permanently outrank new content.
//!
//! The job is idempotent per invocation and safe to skip or repeat; a missed
//! cycle degrades ranking freshness but corrupts nothing. A mutex guard
//! keeps two cycles from overlapping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::config::DecayConfig;
use crate::db::StatStore;

pub struct DecayJob {
    stats: Arc<dyn StatStore>,
    cfg: DecayConfig,
    running: Mutex<()>,
}

impl DecayJob {
    pub fn new(stats: Arc<dyn StatStore>, cfg: DecayConfig) -> Self {
        Self {
            stats,
            cfg,
            running: Mutex::new(()),
        }
    }

    /// Run forever on the configured schedule. Failures are logged and the
    /// next tick proceeds normally.
    pub async fn run(self: Arc<Self>) {
        let interval = Duration::from_secs(self.cfg.interval_secs);
        tracing::info!(
            interval_secs = self.cfg.interval_secs,
            factor = self.cfg.factor,
            floor = self.cfg.stat_floor,
            "Starting decay background job"
        );

        loop {
            sleep(interval).await;
            self.run_once().await;
        }
    }

    /// Apply a single decay cycle. Only one execution may be active at a
    /// time; an overlapping trigger is dropped, not queued.
    pub async fn run_once(&self) {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("Decay cycle already in progress, skipping this tick");
            return;
        };

        let start = Instant::now();
        match self
            .stats
            .decay_all(self.cfg.factor, self.cfg.stat_floor, Utc::now())
            .await
        {
            Ok(rows) => {
                tracing::info!(
                    rows,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Decay cycle applied"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Decay cycle failed; will retry on next tick"
                );
            }
        }
    }
}
