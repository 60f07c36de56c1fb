//! Emotion-proximity ranking
//!
//! Score = 10 - |emotion - baseline|. A perfect match scores 10 and the
//! score falls linearly with distance from the viewer's baseline.
//!
//! Ordering:
//! 1. score, highest first
//! 2. on equal score, stories before posts
//! 3. otherwise arrival order (the sort is stable)
//!
//! Nothing is filtered out; every candidate appears in the output.

use crate::models::{FeedCandidate, ScoredCandidate};
use std::cmp::Ordering;

pub const MAX_SCORE: f64 = 10.0;

/// Score one candidate emotion against the baseline
///
/// Missing or non-finite emotion counts as 0.
pub fn score(emotion: Option<f64>, baseline: f64) -> f64 {
    let emotion = emotion.filter(|v| v.is_finite()).unwrap_or(0.0);
    MAX_SCORE - (emotion - baseline).abs()
}

fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.candidate.kind.cmp(&b.candidate.kind))
}

/// Score and order the candidate pool
pub fn rank_candidates(baseline: f64, candidates: Vec<FeedCandidate>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| ScoredCandidate {
            score: score(candidate.emotion, baseline),
            candidate,
        })
        .collect();

    // slice::sort_by is stable; equal keys keep arrival order
    scored.sort_by(compare);
    scored
}

/// Drop scores, keeping only the ordering
pub fn into_feed(scored: Vec<ScoredCandidate>) -> Vec<FeedCandidate> {
    scored.into_iter().map(|s| s.candidate).collect()
}
