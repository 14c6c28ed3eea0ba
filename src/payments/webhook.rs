//! Payment processor callbacks. The raw request body is authenticated with an
//! HMAC-SHA256 signature before any parsing happens.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    lots::repo::{Lot, LotState},
    reservations::service,
    state::AppState,
};

pub const SIGNATURE_HEADER: &str = "x-payment-signature";

type HmacSha256 = Hmac<Sha256>;

/// Checks a `sha256=<hex>` signature over the raw payload.
pub fn verify_signature(secret: &str, payload: &[u8], header_value: &str) -> bool {
    let Some(hex_sig) = header_value.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub lot_id: Uuid,
}

#[instrument(skip(state, headers, body))]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Falta la firma del webhook".into()))?;

    if !verify_signature(
        &state.config.payments.webhook_secret,
        body.as_bytes(),
        signature,
    ) {
        warn!("webhook signature mismatch");
        return Err(ApiError::Unauthorized("Firma de webhook inválida".into()));
    }

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| ApiError::Validation(format!("Evento de webhook ilegible: {e}")))?;

    match event.kind.as_str() {
        "payment_intent.succeeded" => {
            let lot_id = event.data.lot_id;
            // Re-deliveries of an already applied event are acknowledged as-is.
            if let Some(lot) = Lot::find_by_id(&state.db, lot_id).await? {
                if lot.state == LotState::Pagado {
                    info!(lot_id = %lot_id, "duplicate payment webhook ignored");
                    return Ok(StatusCode::OK);
                }
            }
            service::confirm_payment(&state.db, lot_id).await?;
            info!(lot_id = %lot_id, "payment confirmed via webhook");
        }
        "payment_intent.payment_failed" => {
            if Lot::release_hold(&state.db, event.data.lot_id).await? {
                info!(lot_id = %event.data.lot_id, "hold released after failed payment");
            }
        }
        other => {
            info!(event = other, "unhandled webhook event acknowledged");
        }
    }

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_a_correctly_signed_payload() {
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let header = sign("secreto", payload);
        assert!(verify_signature("secreto", payload, &header));
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = b"payload";
        let header = sign("secreto", payload);
        assert!(!verify_signature("otro-secreto", payload, &header));
    }

    #[test]
    fn rejects_tampered_payload() {
        let header = sign("secreto", b"original");
        assert!(!verify_signature("secreto", b"tampered", &header));
    }

    #[test]
    fn rejects_missing_prefix_and_bad_hex() {
        let payload = b"payload";
        let raw = sign("secreto", payload).replace("sha256=", "");
        assert!(!verify_signature("secreto", payload, &raw));
        assert!(!verify_signature("secreto", payload, "sha256=zzzz"));
    }

    #[test]
    fn event_deserializes_with_type_field() {
        let lot_id = Uuid::new_v4();
        let body = format!(
            r#"{{"type":"payment_intent.succeeded","data":{{"lot_id":"{lot_id}"}}}}"#
        );
        let event: WebhookEvent = serde_json::from_str(&body).unwrap();
        assert_eq!(event.kind, "payment_intent.succeeded");
        assert_eq!(event.data.lot_id, lot_id);
    }
}
