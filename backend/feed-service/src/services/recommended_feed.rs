//! Recommended feed for one viewer
//!
//! The baseline estimate and the candidate-pool fetch do not depend on each
//! other and run concurrently; ranking waits for both. Any failure fails the
//! whole request, so a partially computed feed is never returned.

use crate::db::FeedRepository;
use crate::error::Result;
use crate::metrics;
use crate::models::RecommendedFeed;
use crate::services::baseline::BaselineEstimator;
use crate::services::ranking::{into_feed, rank_candidates};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub const DEFAULT_POOL_WARN_THRESHOLD: usize = 1000;

pub struct RecommendedFeedService {
    repo: Arc<dyn FeedRepository>,
    estimator: BaselineEstimator,
    pool_warn_threshold: usize,
}

impl RecommendedFeedService {
    pub fn new(repo: Arc<dyn FeedRepository>) -> Self {
        Self::with_pool_warn_threshold(repo, DEFAULT_POOL_WARN_THRESHOLD)
    }

    pub fn with_pool_warn_threshold(repo: Arc<dyn FeedRepository>, threshold: usize) -> Self {
        Self {
            estimator: BaselineEstimator::new(repo.clone()),
            repo,
            pool_warn_threshold: threshold,
        }
    }

    pub async fn get_recommended_feed(&self, viewer_id: i64) -> Result<RecommendedFeed> {
        let start = Instant::now();
        let result = self.compute(viewer_id).await;
        metrics::observe_feed_computation(result.is_ok(), start.elapsed());
        result
    }

    async fn compute(&self, viewer_id: i64) -> Result<RecommendedFeed> {
        let (baseline, candidates) = tokio::try_join!(
            self.estimator.estimate(viewer_id),
            self.repo.candidate_pool(viewer_id),
        )?;

        let pool_size = candidates.len();
        metrics::record_baseline_source(baseline.source.as_str());
        metrics::observe_candidate_pool(pool_size);

        // The pool is every post and story in the system, unpaginated.
        if pool_size > self.pool_warn_threshold {
            warn!(
                viewer_id,
                pool_size,
                threshold = self.pool_warn_threshold,
                "Candidate pool exceeds warning threshold; recommended feed scans all content"
            );
        }

        let feed = into_feed(rank_candidates(baseline.value, candidates));

        info!(
            viewer_id,
            baseline = baseline.value,
            source = baseline.source.as_str(),
            pool_size,
            "Recommended feed ranked"
        );

        Ok(RecommendedFeed {
            base_emotion: baseline.value,
            feed,
        })
    }
}
