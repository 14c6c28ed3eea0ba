pub mod dto;
pub mod handlers;
pub mod service;

use crate::state::AppState;
use axum::{routing::post, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reservas", post(handlers::create_reservation))
        .route("/reservas/:id/pagar", post(handlers::pay_reservation))
        .route("/reservas/:id/codigo", post(handlers::issue_pickup_code))
}
