use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    reservations::{
        dto::{PickupCodeResponse, ReservationResponse, ReserveRequest},
        service,
    },
    state::AppState,
};

#[instrument(skip(state, _user))]
pub async fn create_reservation(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let lot = service::reserve(&state.db, payload.lot_id, state.config.hold_minutes).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse {
            reservation_id: lot.id,
            lot: lot.into(),
        }),
    ))
}

#[instrument(skip(state, _user))]
pub async fn pay_reservation(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let lot = service::confirm_payment(&state.db, id).await?;
    Ok(Json(ReservationResponse {
        reservation_id: lot.id,
        lot: lot.into(),
    }))
}

#[instrument(skip(state, _user))]
pub async fn issue_pickup_code(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PickupCodeResponse>, ApiError> {
    let code = service::issue_pickup_code(&state.db, id).await?;
    Ok(Json(PickupCodeResponse {
        reservation_id: id,
        pickup_code: code,
    }))
}
