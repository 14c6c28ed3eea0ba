use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::lots::repo::{Category, Lot, LotState, Unit};

time::serde::format_description!(pub date_fmt, Date, "[year]-[month]-[day]");

/// Request body for creating or replacing a lot's descriptive fields.
#[derive(Debug, Deserialize)]
pub struct LotForm {
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    pub quantity: f64,
    pub unit: Unit,
    pub original_price: f64,
    pub rescue_price: f64,
    #[serde(with = "date_fmt")]
    pub expires_on: Date,
    pub pickup_window: String,
    pub pickup_location: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// Listing filters, all optional.
#[derive(Debug, Deserialize)]
pub struct LotQuery {
    pub q: Option<String>,
    pub category: Option<Category>,
    #[serde(default, with = "date_fmt::option")]
    pub expires_after: Option<Date>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Lot as exposed to clients. The pickup code is deliberately absent; it is
/// only returned by the code-issuance endpoint.
#[derive(Debug, Serialize)]
pub struct LotResponse {
    pub id: Uuid,
    pub provider: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    pub quantity: f64,
    pub unit: Unit,
    pub original_price: f64,
    pub rescue_price: f64,
    #[serde(with = "date_fmt")]
    pub expires_on: Date,
    pub pickup_window: String,
    pub pickup_location: String,
    pub photo_urls: Vec<String>,
    pub state: LotState,
    #[serde(with = "time::serde::rfc3339::option")]
    pub hold_expires_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub pickup_deadline: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Lot> for LotResponse {
    fn from(lot: Lot) -> Self {
        Self {
            id: lot.id,
            provider: lot.provider,
            name: lot.name,
            category: lot.category,
            description: lot.description,
            quantity: lot.quantity,
            unit: lot.unit,
            original_price: lot.original_price,
            rescue_price: lot.rescue_price,
            expires_on: lot.expires_on,
            pickup_window: lot.pickup_window,
            pickup_location: lot.pickup_location,
            photo_urls: lot.photo_urls,
            state: lot.state,
            hold_expires_at: lot.hold_expires_at,
            pickup_deadline: lot.pickup_deadline,
            created_at: lot.created_at,
            updated_at: lot.updated_at,
        }
    }
}
