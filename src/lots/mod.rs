pub mod dto;
pub mod handlers;
pub mod repo;
pub mod window;

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lotes", get(handlers::list_lots).post(handlers::create_lot))
        .route(
            "/lotes/:id",
            get(handlers::get_lot)
                .put(handlers::update_lot)
                .delete(handlers::delete_lot),
        )
}
