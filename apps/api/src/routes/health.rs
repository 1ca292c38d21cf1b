use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "skillsassess-api"
    }))
}

/// GET /api/test
/// Smoke-test route kept from the original backend.
pub async fn api_test_handler() -> Json<Value> {
    Json(json!({ "message": "API is working" }))
}
