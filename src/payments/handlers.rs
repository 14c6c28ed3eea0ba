use axum::{extract::State, Json};
use tracing::{error, info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiError,
    lots::repo::{Lot, LotState},
    payments::{client::PaymentIntent, dto::CreateSimulationRequest},
    state::AppState,
};

/// Creates a (simulated) payment intent for a held lot, priced at its rescue
/// price.
#[instrument(skip(state, _user))]
pub async fn create_simulation(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CreateSimulationRequest>,
) -> Result<Json<PaymentIntent>, ApiError> {
    let lot = Lot::find_by_id(&state.db, payload.lot_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lote no encontrado".into()))?;

    if lot.state != LotState::Reservado {
        return Err(ApiError::Conflict("El lote no está reservado".into()));
    }

    let amount_cents = (lot.rescue_price * 100.0).round() as i64;
    let intent = state
        .payments
        .create_intent(lot.id, amount_cents)
        .await
        .map_err(|e| {
            error!(error = %e, lot_id = %lot.id, "payment intent creation failed");
            ApiError::Internal(e.to_string())
        })?;

    info!(lot_id = %lot.id, intent_id = %intent.id, amount_cents, "payment intent created");
    Ok(Json(intent))
}
