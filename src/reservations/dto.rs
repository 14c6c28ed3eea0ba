use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lots::dto::LotResponse;

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub lot_id: Uuid,
}

/// The reservation id is the lot id; clients use it for the follow-up
/// pay/code calls.
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub reservation_id: Uuid,
    pub lot: LotResponse,
}

#[derive(Debug, Serialize)]
pub struct PickupCodeResponse {
    pub reservation_id: Uuid,
    pub pickup_code: String,
}
