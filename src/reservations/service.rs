//! Reservation hold workflow. A reservation is identified by the lot's own id;
//! there is no separate reservation entity.

use rand::Rng;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    lots::{
        repo::{Lot, LotState},
        window,
    },
};

const PICKUP_CODE_LEN: usize = 6;
const PICKUP_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PICKUP_CODE_ATTEMPTS: usize = 5;

pub fn generate_pickup_code() -> String {
    let mut rng = rand::thread_rng();
    (0..PICKUP_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..PICKUP_CODE_ALPHABET.len());
            PICKUP_CODE_ALPHABET[idx] as char
        })
        .collect()
}

fn lot_not_found() -> ApiError {
    ApiError::NotFound("Lote no encontrado".into())
}

/// `disponible -> reservado` with a bounded hold. The transition is a single
/// conditional update, so two concurrent reservations cannot both win.
pub async fn reserve(db: &PgPool, lot_id: Uuid, hold_minutes: i64) -> Result<Lot, ApiError> {
    if Lot::try_reserve(db, lot_id, hold_minutes).await? {
        info!(lot_id = %lot_id, hold_minutes, "lot reserved");
        return Lot::find_by_id(db, lot_id).await?.ok_or_else(lot_not_found);
    }

    // Nothing was mutated: distinguish a missing lot from an unavailable one.
    match Lot::find_by_id(db, lot_id).await? {
        None => Err(lot_not_found()),
        Some(lot) => {
            warn!(lot_id = %lot_id, state = ?lot.state, "reserve rejected, lot not available");
            Err(ApiError::Conflict("El lote no está disponible".into()))
        }
    }
}

/// `reservado -> pagado` within the hold window. An expired hold is reverted to
/// `disponible` as a side effect of the failed attempt. Sets the pickup
/// deadline from the end of the lot's pickup window.
pub async fn confirm_payment(db: &PgPool, lot_id: Uuid) -> Result<Lot, ApiError> {
    if Lot::release_expired_hold(db, lot_id).await? {
        warn!(lot_id = %lot_id, "payment attempted on expired hold, lot released");
        return Err(ApiError::Conflict(
            "La reserva expiró, vuelve a reservar el lote".into(),
        ));
    }

    let lot = Lot::find_by_id(db, lot_id).await?.ok_or_else(lot_not_found)?;
    if lot.state != LotState::Reservado {
        warn!(lot_id = %lot_id, state = ?lot.state, "payment rejected, lot not reserved");
        return Err(ApiError::Conflict("El lote no está reservado".into()));
    }

    let deadline = window::deadline_from_window(&lot.pickup_window, OffsetDateTime::now_utc())
        .ok_or_else(|| {
            ApiError::Validation("El lote tiene una ventana de retiro ilegible".into())
        })?;

    if !Lot::try_mark_paid(db, lot_id, deadline).await? {
        // The hold lapsed between the check and the update.
        warn!(lot_id = %lot_id, "payment lost the race against hold expiry");
        return Err(ApiError::Conflict(
            "La reserva expiró, vuelve a reservar el lote".into(),
        ));
    }

    info!(lot_id = %lot_id, deadline = %deadline, "lot paid");
    Lot::find_by_id(db, lot_id).await?.ok_or_else(lot_not_found)
}

/// Persist a fresh pickup code on the lot, regardless of its state. Collisions
/// against the unique index are retried with a new code.
pub async fn issue_pickup_code(db: &PgPool, lot_id: Uuid) -> Result<String, ApiError> {
    for _ in 0..PICKUP_CODE_ATTEMPTS {
        let code = generate_pickup_code();
        match Lot::set_pickup_code(db, lot_id, &code).await {
            Ok(true) => {
                info!(lot_id = %lot_id, "pickup code issued");
                let lot = Lot::find_by_id(db, lot_id).await?.ok_or_else(lot_not_found)?;
                return Ok(lot.pickup_code.unwrap_or(code));
            }
            Ok(false) => return Err(lot_not_found()),
            Err(e) if is_unique_violation(&e) => {
                warn!(lot_id = %lot_id, "pickup code collision, retrying");
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(ApiError::Internal(
        "no unique pickup code found after retries".into(),
    ))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_code_is_six_uppercase_alphanumerics() {
        for _ in 0..100 {
            let code = generate_pickup_code();
            assert_eq!(code.len(), PICKUP_CODE_LEN);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn pickup_codes_vary() {
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_pickup_code()).collect();
        // 50 draws from a 36^6 space colliding down to one value would mean a
        // broken RNG.
        assert!(codes.len() > 1);
    }
}
