use api_types::Health;
use axum::Json;
use chrono::Utc;

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
