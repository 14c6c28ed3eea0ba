use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::StoreUser,
    error::ApiError,
    lots::{
        dto::{LotForm, LotQuery, LotResponse},
        repo::{Lot, LotFilter},
        window,
    },
    state::AppState,
};

fn validate_form(form: &LotForm) -> Result<(), ApiError> {
    if form.name.trim().is_empty() {
        return Err(ApiError::Validation("Falta el nombre del lote".into()));
    }
    if form.quantity <= 0.0 {
        return Err(ApiError::Validation(
            "La cantidad debe ser mayor que cero".into(),
        ));
    }
    if form.rescue_price <= 0.0 || form.original_price <= 0.0 {
        return Err(ApiError::Validation(
            "Los precios deben ser mayores que cero".into(),
        ));
    }
    if form.rescue_price >= form.original_price {
        return Err(ApiError::Validation(
            "El precio de rescate debe ser menor que el precio original".into(),
        ));
    }
    if form.expires_on < OffsetDateTime::now_utc().date() {
        return Err(ApiError::Validation(
            "La fecha de vencimiento no puede estar en el pasado".into(),
        ));
    }
    if !window::is_valid_window(&form.pickup_window) {
        return Err(ApiError::Validation(
            "Ventana de retiro inválida, formato esperado HH:MM-HH:MM".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_lots(
    State(state): State<AppState>,
    Query(query): Query<LotQuery>,
) -> Result<Json<Vec<LotResponse>>, ApiError> {
    let filter = LotFilter {
        q: query.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
        category: query.category,
        expires_after: query.expires_after,
        limit: query.limit.clamp(1, 100),
        offset: query.offset.max(0),
    };
    let lots = Lot::list(&state.db, &filter).await?;
    Ok(Json(lots.into_iter().map(LotResponse::from).collect()))
}

/// Hold expiry is enforced lazily here: an overdue `reservado` lot is reverted
/// to `disponible` before the row is read back.
#[instrument(skip(state))]
pub async fn get_lot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LotResponse>, ApiError> {
    if Lot::release_expired_hold(&state.db, id).await? {
        info!(lot_id = %id, "expired hold released on read");
    }
    let lot = Lot::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lote no encontrado".into()))?;
    Ok(Json(lot.into()))
}

#[instrument(skip(state, store, form))]
pub async fn create_lot(
    State(state): State<AppState>,
    StoreUser(store): StoreUser,
    Json(form): Json<LotForm>,
) -> Result<(StatusCode, Json<LotResponse>), ApiError> {
    validate_form(&form)?;
    let lot = Lot::create(&state.db, store.id, &form).await?;
    info!(lot_id = %lot.id, owner_id = %store.id, "lot created");
    Ok((StatusCode::CREATED, Json(lot.into())))
}

#[instrument(skip(state, store, form))]
pub async fn update_lot(
    State(state): State<AppState>,
    StoreUser(store): StoreUser,
    Path(id): Path<Uuid>,
    Json(form): Json<LotForm>,
) -> Result<Json<LotResponse>, ApiError> {
    let existing = Lot::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lote no encontrado".into()))?;
    if existing.owner_id != store.id {
        warn!(lot_id = %id, user_id = %store.id, "update attempt by non-owner");
        return Err(ApiError::Forbidden("El lote pertenece a otra tienda".into()));
    }

    validate_form(&form)?;
    let lot = Lot::update(&state.db, id, &form)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lote no encontrado".into()))?;
    info!(lot_id = %id, "lot updated");
    Ok(Json(lot.into()))
}

#[instrument(skip(state, store))]
pub async fn delete_lot(
    State(state): State<AppState>,
    StoreUser(store): StoreUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = Lot::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lote no encontrado".into()))?;
    if existing.owner_id != store.id {
        warn!(lot_id = %id, user_id = %store.id, "delete attempt by non-owner");
        return Err(ApiError::Forbidden("El lote pertenece a otra tienda".into()));
    }

    Lot::delete(&state.db, id).await?;
    info!(lot_id = %id, "lot deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lots::repo::{Category, Unit};
    use time::Duration;

    fn valid_form() -> LotForm {
        LotForm {
            name: "Cajón de manzanas".into(),
            category: Category::Frutas,
            description: "Manzanas con golpes leves".into(),
            quantity: 5.0,
            unit: Unit::Kg,
            original_price: 10.0,
            rescue_price: 4.0,
            expires_on: OffsetDateTime::now_utc().date() + Duration::days(2),
            pickup_window: "10:00-13:00".into(),
            pickup_location: "Av. Siempre Viva 742".into(),
            photo_urls: vec![],
        }
    }

    #[test]
    fn accepts_valid_form() {
        assert!(validate_form(&valid_form()).is_ok());
    }

    #[test]
    fn rejects_rescue_price_not_below_original() {
        let mut form = valid_form();
        form.rescue_price = form.original_price;
        assert!(matches!(
            validate_form(&form),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let mut form = valid_form();
        form.quantity = 0.0;
        assert!(validate_form(&form).is_err());
    }

    #[test]
    fn rejects_past_expiration_date() {
        let mut form = valid_form();
        form.expires_on = OffsetDateTime::now_utc().date() - Duration::days(1);
        assert!(validate_form(&form).is_err());
    }

    #[test]
    fn rejects_malformed_pickup_window() {
        let mut form = valid_form();
        form.pickup_window = "por la mañana".into();
        assert!(validate_form(&form).is_err());
    }

    #[test]
    fn today_is_a_valid_expiration_date() {
        let mut form = valid_form();
        form.expires_on = OffsetDateTime::now_utc().date();
        assert!(validate_form(&form).is_ok());
    }
}
