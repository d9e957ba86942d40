/// Event Classifier
///
/// Decides whether a read-completion event is genuine engagement or noise.
/// Two pure decisions: the bot filter (discard the event entirely) and the
/// engagement decision (did this read count as a success for the bandit).
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ReadEvent;

/// Any read-end inside the first 7 seconds is presumed a pre-render or
/// bounce artifact.
const MIN_DWELL_MS: i64 = 7_000;

/// Secondary heuristic retained for defense in depth.
const SHORT_DWELL_MS: i64 = 5_000;
const SHALLOW_SCROLL: f64 = 0.15;

/// Reading-time model: 200 words per minute, content floored at 50 words so
/// empty posts cannot blow up the ratio.
const WORDS_PER_MINUTE: f64 = 200.0;
const MIN_WORDS: i64 = 50;

/// Engagement thresholds.
const ENGAGED_RATIO: f64 = 0.6;
const ENGAGED_SCROLL: f64 = 0.7;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Outcome of the engagement decision for a non-bot read event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementDecision {
    pub engaged: bool,
    /// dwell time over expected reading time
    pub ratio: f64,
}

/// True when the event should be discarded as noise.
///
/// Missing values are permissive: a null dwell or scroll never triggers
/// rejection by itself.
pub fn is_bot_like(dwell_ms: Option<i64>, scroll_depth: Option<f64>) -> bool {
    if let Some(dwell) = dwell_ms {
        if dwell < MIN_DWELL_MS {
            return true;
        }
    }

    matches!(
        (dwell_ms, scroll_depth),
        (Some(dwell), Some(scroll)) if dwell < SHORT_DWELL_MS && scroll < SHALLOW_SCROLL
    )
}

/// Expected reading duration in milliseconds for a post of `words` words.
pub fn expected_read_ms(words: i64) -> f64 {
    (words.max(MIN_WORDS) as f64 / WORDS_PER_MINUTE) * 60_000.0
}

/// Engagement decision for an event that passed the bot filter. A missing
/// dwell is coerced to zero rather than failing the event.
pub fn classify_engagement(event: &ReadEvent, words: i64) -> EngagementDecision {
    let expected = expected_read_ms(words);
    let dwell = event.dwell_ms.unwrap_or(0).max(0) as f64;
    let ratio = if expected > 0.0 { dwell / expected } else { 0.0 };

    let engaged = ratio >= ENGAGED_RATIO
        || event
            .scroll_depth
            .map_or(false, |scroll| scroll >= ENGAGED_SCROLL)
        || event.bookmarked
        || event.shared;

    EngagementDecision { engaged, ratio }
}

/// Word count of raw post content: tags stripped, whitespace-split, floored
/// at 50 words.
pub fn word_count(content: &str) -> i64 {
    let stripped = TAG_RE.replace_all(content, " ");
    let count = stripped.split_whitespace().count() as i64;
    count.max(MIN_WORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_event(
        dwell_ms: Option<i64>,
        scroll_depth: Option<f64>,
        bookmarked: bool,
        shared: bool,
    ) -> ReadEvent {
        ReadEvent {
            dwell_ms,
            scroll_depth,
            bookmarked,
            shared,
        }
    }

    #[test]
    fn test_seven_second_floor() {
        // Deep scroll does not save an event inside the 7s floor.
        assert!(is_bot_like(Some(6_000), Some(0.5)));
        assert!(!is_bot_like(Some(8_000), Some(0.9)));
    }

    #[test]
    fn test_shallow_scroll_heuristic() {
        assert!(is_bot_like(Some(4_000), Some(0.1)));
        // Past the 7s floor, shallow scroll alone is not enough.
        assert!(!is_bot_like(Some(7_500), Some(0.05)));
    }

    #[test]
    fn test_missing_values_are_permissive() {
        assert!(!is_bot_like(None, None));
        assert!(!is_bot_like(None, Some(0.01)));
        assert!(!is_bot_like(Some(10_000), None));
    }

    #[test]
    fn test_expected_read_ms() {
        assert_eq!(expected_read_ms(200), 60_000.0);
        // Floors at 50 words.
        assert_eq!(expected_read_ms(0), 15_000.0);
        assert_eq!(expected_read_ms(10), 15_000.0);
    }

    #[test]
    fn test_engaged_by_dwell_ratio() {
        // 200 words -> 60s expected; 40s dwell -> ratio 0.667 >= 0.6.
        let decision = classify_engagement(&read_event(Some(40_000), Some(0.0), false, false), 200);
        assert!(decision.engaged);
        assert!((decision.ratio - 0.6667).abs() < 0.001);
    }

    #[test]
    fn test_not_engaged_short_shallow_read() {
        let decision = classify_engagement(&read_event(Some(10_000), Some(0.2), false, false), 200);
        assert!(!decision.engaged);
    }

    #[test]
    fn test_engaged_by_scroll_bookmark_share() {
        let words = 500;
        assert!(classify_engagement(&read_event(Some(8_000), Some(0.8), false, false), words).engaged);
        assert!(classify_engagement(&read_event(Some(8_000), None, true, false), words).engaged);
        assert!(classify_engagement(&read_event(Some(8_000), None, false, true), words).engaged);
    }

    #[test]
    fn test_missing_dwell_coerced_to_zero() {
        let decision = classify_engagement(&read_event(None, None, false, false), 200);
        assert!(!decision.engaged);
        assert_eq!(decision.ratio, 0.0);
    }

    #[test]
    fn test_word_count_strips_tags_and_floors() {
        assert_eq!(word_count(""), 50);
        assert_eq!(word_count("<p>one two three</p>"), 50);

        let long = (0..120).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        assert_eq!(word_count(&long), 120);
        assert_eq!(word_count(&format!("<div class=\"x\">{}</div>", long)), 120);
    }
}
