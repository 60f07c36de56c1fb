use actix_web::{get, web, HttpResponse};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::RecommendedFeedService;

pub struct RecommendedFeedState {
    pub service: Arc<RecommendedFeedService>,
}

/// Emotion-ranked feed for the authenticated viewer
///
/// Response: `{ "baseEmotion": number, "feed": [...] }`. The per-item score is
/// not exposed; only the ordering is.
#[get("/recommended")]
pub async fn get_recommended_feed(
    user: UserId,
    state: web::Data<RecommendedFeedState>,
) -> Result<HttpResponse> {
    debug!("Recommended feed request: viewer={}", user.0);

    let feed = state.service.get_recommended_feed(user.0).await?;

    Ok(HttpResponse::Ok().json(feed))
}
