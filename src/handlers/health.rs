use axum::Json;
use chrono::Utc;

// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "status": "UP",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
