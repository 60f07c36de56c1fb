//! Emotional baseline of a viewer
//!
//! The baseline blends two signals:
//! - the emotion of the viewer's latest story (what they feel right now)
//! - the average emotion of all their posts (their longer-run tone)
//!
//! Story 70% + posts 30% when both exist, whichever exists otherwise, and a
//! neutral 5 without any history. The result is rounded to 2 decimals.

use crate::db::FeedRepository;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const STORY_WEIGHT: f64 = 0.7;
pub const POST_WEIGHT: f64 = 0.3;
pub const NEUTRAL_BASELINE: f64 = 5.0;

/// Which signals produced a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    Blended,
    StoryOnly,
    PostsOnly,
    Neutral,
}

impl BaselineSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineSource::Blended => "blended",
            BaselineSource::StoryOnly => "story_only",
            BaselineSource::PostsOnly => "posts_only",
            BaselineSource::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub value: f64,
    pub story_emotion: Option<f64>,
    pub post_avg_emotion: Option<f64>,
    pub source: BaselineSource,
}

/// Round half away from zero to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Combine the two signals into a baseline
///
/// Non-finite inputs count as absent. The post average is rounded to 2
/// decimals before weighting.
pub fn combine_signals(story_emotion: Option<f64>, post_avg_emotion: Option<f64>) -> Baseline {
    let story = story_emotion.filter(|v| v.is_finite());
    let posts = post_avg_emotion.filter(|v| v.is_finite()).map(round2);

    let (raw, source) = match (story, posts) {
        (Some(s), Some(p)) => (s * STORY_WEIGHT + p * POST_WEIGHT, BaselineSource::Blended),
        (Some(s), None) => (s, BaselineSource::StoryOnly),
        (None, Some(p)) => (p, BaselineSource::PostsOnly),
        (None, None) => (NEUTRAL_BASELINE, BaselineSource::Neutral),
    };

    Baseline {
        value: round2(raw),
        story_emotion: story,
        post_avg_emotion: posts,
        source,
    }
}

/// Computes a viewer's baseline from their stories and posts
#[derive(Clone)]
pub struct BaselineEstimator {
    repo: Arc<dyn FeedRepository>,
}

impl BaselineEstimator {
    pub fn new(repo: Arc<dyn FeedRepository>) -> Self {
        Self { repo }
    }

    /// Both reads are independent and issued concurrently; either failing
    /// fails the estimate.
    pub async fn estimate(&self, viewer_id: i64) -> Result<Baseline> {
        let (story_emotion, post_avg_emotion) = tokio::try_join!(
            self.repo.latest_story_emotion(viewer_id),
            self.repo.post_average_emotion(viewer_id),
        )?;

        let baseline = combine_signals(story_emotion, post_avg_emotion);

        debug!(
            viewer_id,
            story_emotion = ?baseline.story_emotion,
            post_avg_emotion = ?baseline.post_avg_emotion,
            baseline = baseline.value,
            source = baseline.source.as_str(),
            "Emotional baseline computed"
        );

        Ok(baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockFeedRepository;
    use crate::error::AppError;

    #[test]
    fn test_blends_story_and_posts() {
        let baseline = combine_signals(Some(8.0), Some(4.0));
        assert_eq!(baseline.value, 6.8);
        assert_eq!(baseline.source, BaselineSource::Blended);
    }

    #[test]
    fn test_story_only() {
        let baseline = combine_signals(Some(9.0), None);
        assert_eq!(baseline.value, 9.0);
        assert_eq!(baseline.source, BaselineSource::StoryOnly);
    }

    #[test]
    fn test_posts_only() {
        let baseline = combine_signals(None, Some(3.0));
        assert_eq!(baseline.value, 3.0);
        assert_eq!(baseline.source, BaselineSource::PostsOnly);
    }

    #[test]
    fn test_neutral_without_history() {
        let baseline = combine_signals(None, None);
        assert_eq!(baseline.value, NEUTRAL_BASELINE);
        assert_eq!(baseline.source, BaselineSource::Neutral);
    }

    #[test]
    fn test_post_average_rounded_before_blending() {
        let baseline = combine_signals(None, Some(14.0 / 3.0));
        assert_eq!(baseline.post_avg_emotion, Some(4.67));
        assert_eq!(baseline.value, 4.67);

        // 7 * 0.7 + 4.67 * 0.3 = 6.301
        let blended = combine_signals(Some(7.0), Some(14.0 / 3.0));
        assert_eq!(blended.post_avg_emotion, Some(4.67));
        assert_eq!(blended.value, 6.3);
    }

    #[test]
    fn test_result_rounded_to_two_decimals() {
        let baseline = combine_signals(Some(3.0), Some(7.77));
        // 2.1 + 2.331 = 4.431
        assert_eq!(baseline.value, 4.43);
    }

    #[test]
    fn test_non_finite_signals_are_absent() {
        let baseline = combine_signals(Some(f64::NAN), Some(f64::INFINITY));
        assert_eq!(baseline.value, NEUTRAL_BASELINE);
        assert_eq!(baseline.source, BaselineSource::Neutral);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.666_666), 4.67);
        assert_eq!(round2(6.800_000_000_000_001), 6.8);
        assert_eq!(round2(2.0), 2.0);
    }

    #[tokio::test]
    async fn test_estimate_reads_both_signals() {
        let mut repo = MockFeedRepository::new();
        repo.expect_latest_story_emotion()
            .withf(|viewer| *viewer == 42)
            .times(1)
            .returning(|_| Ok(Some(8.0)));
        repo.expect_post_average_emotion()
            .withf(|viewer| *viewer == 42)
            .times(1)
            .returning(|_| Ok(Some(4.0)));

        let estimator = BaselineEstimator::new(Arc::new(repo));
        let baseline = estimator.estimate(42).await.unwrap();

        assert_eq!(baseline.value, 6.8);
        assert_eq!(baseline.story_emotion, Some(8.0));
        assert_eq!(baseline.post_avg_emotion, Some(4.0));
    }

    #[tokio::test]
    async fn test_estimate_propagates_storage_failure() {
        let mut repo = MockFeedRepository::new();
        repo.expect_latest_story_emotion()
            .returning(|_| Ok(Some(8.0)));
        repo.expect_post_average_emotion()
            .returning(|_| Err(AppError::Database("connection reset".to_string())));

        let estimator = BaselineEstimator::new(Arc::new(repo));
        let result = estimator.estimate(1).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
