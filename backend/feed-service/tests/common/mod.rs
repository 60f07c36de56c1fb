//! Shared fixtures for feed-service integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_service::{AppError, ContentKind, FeedCandidate, FeedRepository, Result};
use std::collections::HashMap;
use std::sync::Once;

pub const TEST_JWT_SECRET: &str = "feed-service-test-secret";

pub fn init_jwt() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        crypto_core::jwt::initialize_jwt_secret(TEST_JWT_SECRET, 3600)
            .expect("Failed to initialize test JWT secret");
    });
}

pub fn bearer_for(user_id: i64) -> String {
    init_jwt();
    let token = crypto_core::jwt::generate_access_token(user_id, "tester", None, None)
        .expect("Failed to generate test token");
    format!("Bearer {}", token)
}

pub fn candidate(kind: ContentKind, id: i64, emotion: Option<f64>) -> FeedCandidate {
    FeedCandidate {
        kind,
        id,
        author_id: 500 + id,
        content: format!("{} #{}", kind, id),
        emotion,
        like_count: id % 4,
        is_liked: id % 2 == 0,
        author_nickname: format!("author{}", id),
        author_profile_url: None,
        media_urls: vec![format!("/uploads/{}/{}.jpg", kind.as_str().to_lowercase(), id)],
        created_at: DateTime::<Utc>::from_timestamp(1_700_000_000 - id * 60, 0)
            .expect("valid timestamp"),
    }
}

/// In-memory stand-in for the feed tables
#[derive(Default)]
pub struct InMemoryFeedRepository {
    pub latest_story: HashMap<i64, f64>,
    pub post_average: HashMap<i64, f64>,
    pub pool: Vec<FeedCandidate>,
    pub fail_pool: bool,
}

#[async_trait]
impl FeedRepository for InMemoryFeedRepository {
    async fn latest_story_emotion(&self, viewer_id: i64) -> Result<Option<f64>> {
        Ok(self.latest_story.get(&viewer_id).copied())
    }

    async fn post_average_emotion(&self, viewer_id: i64) -> Result<Option<f64>> {
        Ok(self.post_average.get(&viewer_id).copied())
    }

    async fn candidate_pool(&self, _viewer_id: i64) -> Result<Vec<FeedCandidate>> {
        if self.fail_pool {
            return Err(AppError::Database(
                "could not connect to server: Connection refused".to_string(),
            ));
        }
        Ok(self.pool.clone())
    }
}
