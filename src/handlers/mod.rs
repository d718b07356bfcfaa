pub mod portal;
pub mod webhooks;

use axum::{routing::get, Json, Router};

use crate::db::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(webhooks::router())
        .merge(portal::router())
}
