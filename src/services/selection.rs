/// Selection Policy
///
/// Turns scored candidates into the final ordered top-K list:
/// 1. sort by score descending;
/// 2. greedy one-post-per-category pass so a single prolific category
///    cannot monopolize the rail;
/// 3. fill remaining slots by score;
/// 4. best-effort freshness guarantee: if nothing chosen is fresh, the last
///    slot is given to the best-scored fresh candidate.
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::models::Post;
use crate::services::scoring::ScoredPost;

pub fn select_top_k(
    mut scored: Vec<ScoredPost>,
    k: usize,
    now: DateTime<Utc>,
    fresh_hours: i64,
) -> Vec<Post> {
    if k == 0 || scored.is_empty() {
        return Vec::new();
    }

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut chosen: Vec<&ScoredPost> = Vec::with_capacity(k);
    let mut chosen_ids: HashSet<uuid::Uuid> = HashSet::new();
    let mut seen_categories: HashSet<String> = HashSet::new();

    // Diversity pass: best post of each category, highest score first.
    // Uncategorized posts share a single empty-string bucket.
    for item in &scored {
        if chosen.len() == k {
            break;
        }
        let category = item.post.category.clone().unwrap_or_default();
        if seen_categories.contains(&category) {
            continue;
        }
        seen_categories.insert(category);
        chosen_ids.insert(item.post.id);
        chosen.push(item);
    }

    // Fill pass: remaining slots by raw score.
    for item in &scored {
        if chosen.len() == k {
            break;
        }
        if chosen_ids.insert(item.post.id) {
            chosen.push(item);
        }
    }

    // Freshness guarantee: swap the last slot for the best fresh candidate
    // when nothing fresh made the cut. No-op if no fresh candidate exists.
    let has_fresh = chosen.iter().any(|item| item.post.is_fresh(now, fresh_hours));
    if !has_fresh && !chosen.is_empty() {
        let replacement = scored.iter().find(|item| {
            item.post.is_fresh(now, fresh_hours) && !chosen_ids.contains(&item.post.id)
        });
        if let Some(fresh) = replacement {
            let last = chosen.len() - 1;
            chosen[last] = fresh;
        }
    }

    chosen.into_iter().map(|item| item.post.clone()).collect()
}
