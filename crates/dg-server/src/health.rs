use actix_web::HttpResponse;
use actix_web::Responder;
use std::sync::OnceLock;
use std::time::Instant;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Marks the process start time for `/health`'s `uptime` field. Must be
/// called once at boot, before the server starts accepting connections.
pub fn record_start_time() {
    STARTED_AT.get_or_init(Instant::now);
}

/// Liveness probe (spec §6): `{status, timestamp, uptime, version,
/// environment}`. Always `status: "ok"` once the process is serving
/// requests at all; distinguishing degraded states is `/ready`'s job.
pub async fn health() -> impl Responder {
    let uptime = STARTED_AT.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let environment = std::env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string());
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": timestamp,
        "uptime": uptime,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": environment,
    }))
}

/// Readiness probe (spec §6): `{ready: true}` once the process can serve
/// gateway traffic, which for this server is true as soon as it binds.
pub async fn ready() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "ready": true }))
}
