//! Data access for the recommended feed
//!
//! The feed only reads. `FeedRepository` is the seam between the ranking core
//! and storage; `PgFeedRepository` is the PostgreSQL implementation.

pub mod feed_repo;

use crate::error::Result;
use crate::models::FeedCandidate;
use async_trait::async_trait;

pub use feed_repo::PgFeedRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Emotion of the viewer's most recently created story, if any
    async fn latest_story_emotion(&self, viewer_id: i64) -> Result<Option<f64>>;

    /// Mean emotion over all of the viewer's posts, rounded to 2 decimals
    async fn post_average_emotion(&self, viewer_id: i64) -> Result<Option<f64>>;

    /// Every post and story with like count, viewer-liked flag and media URLs
    async fn candidate_pool(&self, viewer_id: i64) -> Result<Vec<FeedCandidate>>;
}
