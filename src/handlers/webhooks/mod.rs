pub mod common;
pub mod paddle;

pub use paddle::handle_paddle_webhook;

use axum::{routing::post, Router};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/paddle", post(handle_paddle_webhook))
}
