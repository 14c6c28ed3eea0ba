use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateSimulationRequest {
    pub lot_id: Uuid,
}
