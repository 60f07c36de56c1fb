pub mod baseline;
pub mod ranking;
pub mod recommended_feed;

pub use baseline::{combine_signals, Baseline, BaselineEstimator, BaselineSource};
pub use ranking::{rank_candidates, score};
pub use recommended_feed::RecommendedFeedService;
