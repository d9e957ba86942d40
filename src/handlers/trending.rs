/// Trending API Handlers
///
/// HTTP endpoints for the trending list and engagement events. Callers may
/// reference a post by id or by slug; the raw string is parsed into a typed
/// `PostRef` before anything else happens.
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{Post, PostRef, ReadEvent};
use crate::services::{ReadEndOutcome, TrendingService};

pub struct TrendingState {
    pub service: Arc<TrendingService>,
}

/// Query parameters for GET /trending
#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    /// Number of posts to return (clamped to [1, 50])
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Candidate lookback in days (default 60); ignored when all=1
    pub window_days: Option<i64>,

    /// Debug bypass: 1 includes all posts regardless of publication time
    #[serde(default)]
    pub all: u8,
}

fn default_limit() -> usize {
    4
}

/// Engagement event request; `post_ref` is a post id or slug.
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub post_ref: Option<String>,
}

/// Read-end event request
#[derive(Debug, Deserialize)]
pub struct ReadEndRequest {
    pub post_ref: Option<String>,
    pub dwell_ms: Option<i64>,
    pub scroll_depth: Option<f64>,
    #[serde(default)]
    pub bookmarked: bool,
    #[serde(default)]
    pub shared: bool,
}

/// One entry of the trending response
#[derive(Debug, Serialize)]
pub struct TrendingItem {
    pub rank: usize,
    pub id: uuid::Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub items: Vec<TrendingItem>,
    pub count: usize,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl TrendingResponse {
    fn from_posts(posts: Vec<Post>) -> Self {
        let items: Vec<TrendingItem> = posts
            .into_iter()
            .enumerate()
            .map(|(i, post)| TrendingItem {
                rank: i + 1,
                id: post.id,
                slug: post.slug.clone(),
                title: post.title.clone(),
                category: post.category.clone(),
                published_at: post.publish_time(),
            })
            .collect();

        Self {
            count: items.len(),
            items,
            updated_at: Utc::now(),
        }
    }
}

fn parse_post_ref(raw: &Option<String>) -> Result<PostRef> {
    match raw.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(PostRef::parse(s)),
        _ => Err(AppError::BadRequest("post_ref required".to_string())),
    }
}

/// GET /api/v1/trending
pub async fn get_trending(
    query: web::Query<TrendingQuery>,
    state: web::Data<TrendingState>,
) -> Result<HttpResponse> {
    debug!(
        limit = query.limit,
        window_days = ?query.window_days,
        all = query.all,
        "Trending request"
    );

    let posts = state
        .service
        .get_trending(query.limit, query.window_days, query.all == 1)
        .await?;

    Ok(HttpResponse::Ok().json(TrendingResponse::from_posts(posts)))
}

/// POST /api/v1/trending/events/impression
pub async fn track_impression(
    body: web::Json<EventRequest>,
    state: web::Data<TrendingState>,
) -> Result<HttpResponse> {
    let post_ref = parse_post_ref(&body.post_ref)?;
    state.service.record_impression(&post_ref).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}

/// POST /api/v1/trending/events/click
pub async fn track_click(
    body: web::Json<EventRequest>,
    state: web::Data<TrendingState>,
) -> Result<HttpResponse> {
    let post_ref = parse_post_ref(&body.post_ref)?;
    state.service.record_click(&post_ref).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}

/// POST /api/v1/trending/events/read-end
pub async fn track_read_end(
    body: web::Json<ReadEndRequest>,
    state: web::Data<TrendingState>,
) -> Result<HttpResponse> {
    let post_ref = parse_post_ref(&body.post_ref)?;
    let event = ReadEvent {
        dwell_ms: body.dwell_ms,
        scroll_depth: body.scroll_depth,
        bookmarked: body.bookmarked,
        shared: body.shared,
    };

    let outcome = state.service.record_read_end(&post_ref, &event).await?;

    let response = match outcome {
        ReadEndOutcome::Ignored => serde_json::json!({ "ok": true, "ignored": true }),
        ReadEndOutcome::Recorded { engaged, ratio } => {
            serde_json::json!({ "ok": true, "engaged": engaged, "ratio": ratio })
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_ref_rejects_missing() {
        assert!(parse_post_ref(&None).is_err());
        assert!(parse_post_ref(&Some("".to_string())).is_err());
        assert!(parse_post_ref(&Some("   ".to_string())).is_err());
    }

    #[test]
    fn test_parse_post_ref_accepts_id_and_slug() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            parse_post_ref(&Some(id.to_string())).unwrap(),
            PostRef::Id(id)
        );
        assert_eq!(
            parse_post_ref(&Some("my-post".to_string())).unwrap(),
            PostRef::Slug("my-post".to_string())
        );
    }
}
