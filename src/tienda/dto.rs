use serde::Serialize;

/// Aggregates backing the store metrics page.
#[derive(Debug, Default, Serialize)]
pub struct StoreMetrics {
    pub total_lots: i64,
    pub available: i64,
    pub reserved: i64,
    pub paid: i64,
    pub picked_up: i64,
    pub expired: i64,
    pub donated: i64,
    /// Sum of rescue prices over paid and picked-up lots.
    pub rescued_revenue: f64,
}
