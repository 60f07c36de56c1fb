use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_service::config::Config;
use feed_service::handlers::{self, RecommendedFeedState};
use feed_service::{PgFeedRepository, RecommendedFeedService};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();
}

fn build_cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default();
    for origin in allowed_origins.split(',') {
        let origin = origin.trim();
        if origin.is_empty() {
            continue;
        }
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    if let Err(e) = crypto_core::jwt::initialize_jwt_secret(
        &config.auth.jwt_secret,
        config.auth.jwt_expires_in_secs,
    ) {
        tracing::error!("Failed to initialize JWT secret: {}", e);
        eprintln!("ERROR: Failed to initialize JWT secret: {}", e);
        std::process::exit(1);
    }
    info!("JWT validation initialized");

    let mut db_cfg = db_pool::DbConfig::for_service("feed-service");
    db_cfg.database_url = config.database.url.clone();
    if let Some(max_connections) = config.database.max_connections {
        db_cfg = db_cfg.with_max_connections(max_connections);
    }
    db_cfg.log_config();

    let db_pool = match db_pool::create_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(PgFeedRepository::new(db_pool));
    let feed_state = web::Data::new(RecommendedFeedState {
        service: Arc::new(RecommendedFeedService::with_pool_warn_threshold(
            repo,
            config.feed.pool_warn_threshold,
        )),
    });

    let allowed_origins = config.cors.allowed_origins.clone();
    if config.is_production() && allowed_origins.split(',').any(|o| o.trim() == "*") {
        tracing::warn!("CORS allows any origin in production");
    }
    let bind_addr = format!("0.0.0.0:{}", config.app.port);
    info!("HTTP server listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(feed_state.clone())
            .wrap(build_cors(&allowed_origins))
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap_fn(|req, srv| feed_service::metrics::track_request(req, srv))
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
