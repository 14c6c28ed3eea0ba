use axum::{extract::State, Json};
use tracing::instrument;

use crate::{
    auth::{dto::PublicUser, repo::User, StoreUser},
    error::ApiError,
    lots::repo::LotState,
    state::AppState,
    tienda::dto::StoreMetrics,
};

#[instrument(skip(state, store))]
pub async fn get_me(
    State(state): State<AppState>,
    StoreUser(store): StoreUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, store.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Usuario no encontrado".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, store))]
pub async fn get_metrics(
    State(state): State<AppState>,
    StoreUser(store): StoreUser,
) -> Result<Json<StoreMetrics>, ApiError> {
    let counts = sqlx::query_as::<_, (LotState, i64)>(
        r#"
        SELECT state, COUNT(*)
        FROM lots
        WHERE owner_id = $1
        GROUP BY state
        "#,
    )
    .bind(store.id)
    .fetch_all(&state.db)
    .await?;

    let rescued_revenue = sqlx::query_scalar::<_, f64>(
        r#"
        SELECT COALESCE(SUM(rescue_price), 0)
        FROM lots
        WHERE owner_id = $1 AND state IN ('pagado', 'retirado')
        "#,
    )
    .bind(store.id)
    .fetch_one(&state.db)
    .await?;

    let mut metrics = StoreMetrics {
        rescued_revenue,
        ..Default::default()
    };
    for (lot_state, count) in counts {
        metrics.total_lots += count;
        match lot_state {
            LotState::Disponible => metrics.available = count,
            LotState::Reservado => metrics.reserved = count,
            LotState::Pagado => metrics.paid = count,
            LotState::Retirado => metrics.picked_up = count,
            LotState::Vencido => metrics.expired = count,
            LotState::Donado => metrics.donated = count,
        }
    }

    Ok(Json(metrics))
}
