// handlers/system.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "DevCamper API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "bootcamps": "/api/v1/bootcamps[/:id] (public read)",
                "radius": "/api/v1/bootcamps/radius/:zipcode/:distance (public)",
                "photo": "/api/v1/bootcamps/:id/photo (publisher, admin)",
                "courses": "/api/v1/courses[/:id], /api/v1/bootcamps/:id/courses",
                "reviews": "/api/v1/reviews[/:id], /api/v1/bootcamps/:id/reviews",
                "users": "/api/v1/users[/:id] (admin)",
                "auth": "/api/v1/auth/me (authenticated)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
