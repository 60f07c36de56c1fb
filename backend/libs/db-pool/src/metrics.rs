//! Prometheus metrics for the database connection pool

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use std::time::Instant;

lazy_static::lazy_static! {
    /// Pool connections by state (idle/active/max)
    static ref DB_POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "Database pool connection count by state",
        &["service", "state"]
    ).expect("Prometheus metrics registration should succeed at startup");

    static ref DB_POOL_ACQUIRE_DURATION: HistogramVec = register_histogram_vec!(
        "db_pool_acquire_duration_seconds",
        "Time to acquire connection from pool",
        &["service"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]
    ).expect("Prometheus metrics registration should succeed at startup");

    static ref DB_POOL_CONNECTION_ERRORS: IntCounterVec = register_int_counter_vec!(
        "db_pool_connection_errors_total",
        "Connection acquisition errors",
        &["service", "error_type"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

/// Refresh pool gauges (called periodically)
pub(crate) fn update_pool_metrics(pool: &PgPool, service: &str) {
    let size = pool.size() as i64;
    let idle = pool.num_idle() as i64;

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "idle"])
        .set(idle);
    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "active"])
        .set(size - idle);
    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "max"])
        .set(pool.options().get_max_connections() as i64);
}

/// Acquire a connection and record acquisition latency and failures
///
/// Drop-in replacement for `pool.acquire().await`.
pub async fn acquire_with_metrics(
    pool: &PgPool,
    service: &str,
) -> Result<PoolConnection<Postgres>, sqlx::Error> {
    let start = Instant::now();
    let result = pool.acquire().await;

    DB_POOL_ACQUIRE_DURATION
        .with_label_values(&[service])
        .observe(start.elapsed().as_secs_f64());

    if let Err(e) = &result {
        DB_POOL_CONNECTION_ERRORS
            .with_label_values(&[service, error_label(e)])
            .inc();
    }

    result
}

fn error_label(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut => "timeout",
        sqlx::Error::PoolClosed => "closed",
        _ => "other",
    }
}
