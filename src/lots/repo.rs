use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::lots::dto::LotForm;

/// Canonical lot lifecycle. `retirado` and `donado` are terminal states that
/// exist in the data model but have no transition handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "lot_state", rename_all = "lowercase")]
pub enum LotState {
    Disponible,
    Reservado,
    Pagado,
    Retirado,
    Vencido,
    Donado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lot_category")]
pub enum Category {
    Frutas,
    Verduras,
    #[serde(rename = "Lácteos")]
    #[sqlx(rename = "Lácteos")]
    Lacteos,
    Carnes,
    #[serde(rename = "Panadería")]
    #[sqlx(rename = "Panadería")]
    Panaderia,
    Otros,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "lot_unit", rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Unidades,
    Litros,
}

const LOT_COLUMNS: &str = r#"
    l.id, l.owner_id, u.display_name AS provider, l.name, l.category, l.description,
    l.quantity, l.unit, l.original_price, l.rescue_price, l.expires_on,
    l.pickup_window, l.pickup_location, l.photo_urls, l.state, l.hold_expires_at,
    l.pickup_deadline, l.pickup_code, l.created_at, l.updated_at
"#;

#[derive(Debug, Clone, FromRow)]
pub struct Lot {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Display name of the owning store, joined from `users`.
    pub provider: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    pub quantity: f64,
    pub unit: Unit,
    pub original_price: f64,
    pub rescue_price: f64,
    pub expires_on: Date,
    pub pickup_window: String,
    pub pickup_location: String,
    pub photo_urls: Vec<String>,
    pub state: LotState,
    pub hold_expires_at: Option<OffsetDateTime>,
    pub pickup_deadline: Option<OffsetDateTime>,
    pub pickup_code: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct LotFilter {
    /// Case-insensitive name substring.
    pub q: Option<String>,
    pub category: Option<Category>,
    /// Lower bound on the expiration date.
    pub expires_after: Option<Date>,
    pub limit: i64,
    pub offset: i64,
}

impl Lot {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Lot>, sqlx::Error> {
        sqlx::query_as::<_, Lot>(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM lots l JOIN users u ON u.id = l.owner_id
            WHERE l.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Marketplace listing: only lots a buyer can still act on.
    pub async fn list(db: &PgPool, filter: &LotFilter) -> Result<Vec<Lot>, sqlx::Error> {
        sqlx::query_as::<_, Lot>(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM lots l JOIN users u ON u.id = l.owner_id
            WHERE l.state IN ('disponible', 'reservado')
              AND ($1::text IS NULL OR l.name ILIKE '%' || $1 || '%')
              AND ($2::lot_category IS NULL OR l.category = $2)
              AND ($3::date IS NULL OR l.expires_on >= $3)
            ORDER BY l.expires_on ASC, l.created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.q.as_deref())
        .bind(filter.category)
        .bind(filter.expires_after)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(db)
        .await
    }

    pub async fn create(db: &PgPool, owner_id: Uuid, form: &LotForm) -> Result<Lot, sqlx::Error> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO lots (owner_id, name, category, description, quantity, unit,
                              original_price, rescue_price, expires_on, pickup_window,
                              pickup_location, photo_urls)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(&form.name)
        .bind(form.category)
        .bind(&form.description)
        .bind(form.quantity)
        .bind(form.unit)
        .bind(form.original_price)
        .bind(form.rescue_price)
        .bind(form.expires_on)
        .bind(&form.pickup_window)
        .bind(&form.pickup_location)
        .bind(&form.photo_urls)
        .fetch_one(db)
        .await?;

        Self::find_by_id(db, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Replace the descriptive fields. State and hold columns are untouched.
    pub async fn update(db: &PgPool, id: Uuid, form: &LotForm) -> Result<Option<Lot>, sqlx::Error> {
        let updated = sqlx::query(
            r#"
            UPDATE lots
            SET name = $2, category = $3, description = $4, quantity = $5, unit = $6,
                original_price = $7, rescue_price = $8, expires_on = $9,
                pickup_window = $10, pickup_location = $11, photo_urls = $12,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&form.name)
        .bind(form.category)
        .bind(&form.description)
        .bind(form.quantity)
        .bind(form.unit)
        .bind(form.original_price)
        .bind(form.rescue_price)
        .bind(form.expires_on)
        .bind(&form.pickup_window)
        .bind(&form.pickup_location)
        .bind(&form.photo_urls)
        .execute(db)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(None);
        }
        Self::find_by_id(db, id).await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lots WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Conditional `disponible -> reservado` transition. Returns false when the
    /// lot is missing or not available, with no side effect.
    pub async fn try_reserve(db: &PgPool, id: Uuid, hold_minutes: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET state = 'reservado',
                hold_expires_at = now() + make_interval(mins => $2),
                updated_at = now()
            WHERE id = $1 AND state = 'disponible'
            "#,
        )
        .bind(id)
        .bind(hold_minutes as i32)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revert an overdue hold. Returns true when a revert happened.
    pub async fn release_expired_hold(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET state = 'disponible', hold_expires_at = NULL, updated_at = now()
            WHERE id = $1 AND state = 'reservado' AND hold_expires_at < now()
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revert a hold regardless of its expiry (failed payment path).
    pub async fn release_hold(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET state = 'disponible', hold_expires_at = NULL, updated_at = now()
            WHERE id = $1 AND state = 'reservado'
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Conditional `reservado -> pagado` transition, guarded on a live hold.
    pub async fn try_mark_paid(
        db: &PgPool,
        id: Uuid,
        pickup_deadline: OffsetDateTime,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET state = 'pagado', hold_expires_at = NULL, pickup_deadline = $2,
                updated_at = now()
            WHERE id = $1 AND state = 'reservado' AND hold_expires_at >= now()
            "#,
        )
        .bind(id)
        .bind(pickup_deadline)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist a pickup code unconditionally of state. Collisions surface as a
    /// unique violation for the caller to retry.
    pub async fn set_pickup_code(db: &PgPool, id: Uuid, code: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET pickup_code = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(code)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LotState::Disponible).unwrap(), r#""disponible""#);
        assert_eq!(serde_json::to_string(&LotState::Reservado).unwrap(), r#""reservado""#);
        assert_eq!(serde_json::to_string(&LotState::Pagado).unwrap(), r#""pagado""#);
        assert_eq!(serde_json::to_string(&LotState::Vencido).unwrap(), r#""vencido""#);
    }

    #[test]
    fn category_keeps_accented_names() {
        assert_eq!(serde_json::to_string(&Category::Lacteos).unwrap(), r#""Lácteos""#);
        assert_eq!(serde_json::to_string(&Category::Panaderia).unwrap(), r#""Panadería""#);
        let parsed: Category = serde_json::from_str(r#""Lácteos""#).unwrap();
        assert_eq!(parsed, Category::Lacteos);
    }

    #[test]
    fn unit_roundtrips() {
        for (unit, text) in [
            (Unit::Kg, r#""kg""#),
            (Unit::Unidades, r#""unidades""#),
            (Unit::Litros, r#""litros""#),
        ] {
            assert_eq!(serde_json::to_string(&unit).unwrap(), text);
            let parsed: Unit = serde_json::from_str(text).unwrap();
            assert_eq!(parsed, unit);
        }
    }
}
