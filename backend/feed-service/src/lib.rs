pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

pub use db::{FeedRepository, PgFeedRepository};
pub use models::{ContentKind, FeedCandidate, RecommendedFeed, ScoredCandidate};
pub use services::{Baseline, BaselineEstimator, BaselineSource, RecommendedFeedService};
