pub mod dto;
pub mod handlers;

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tienda/me", get(handlers::get_me))
        .route("/tienda/metrics", get(handlers::get_metrics))
}
