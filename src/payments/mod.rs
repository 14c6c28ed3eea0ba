pub mod client;
pub mod dto;
pub mod handlers;
pub mod webhook;

use crate::state::AppState;
use axum::{routing::post, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments/create-simulation", post(handlers::create_simulation))
        .route("/payments/webhook", post(webhook::payment_webhook))
}
