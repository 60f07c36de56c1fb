use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
}

pub async fn health_summary() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        message: "feed-service is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
