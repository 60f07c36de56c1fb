pub mod health;
pub mod recommended;

use actix_web::web;

use crate::middleware::JwtAuthMiddleware;

pub use health::{health_summary, liveness};
pub use recommended::{get_recommended_feed, RecommendedFeedState};

/// Register feed-service routes
///
/// The caller provides `web::Data<RecommendedFeedState>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(liveness))
        .route("/api/health", web::get().to(health_summary))
        .route("/api/v1/health/live", web::get().to(liveness))
        .route("/api/v1/health/ready", web::get().to(liveness))
        .route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .service(
            web::scope("/api/posts")
                .wrap(JwtAuthMiddleware)
                .service(get_recommended_feed),
        );
}
