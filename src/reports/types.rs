use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Completed collections for one zone on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDailySummary {
    pub zone_id: String,
    pub date: NaiveDate,
    /// Distinct vehicles that completed a collection that day.
    pub vehicle_count: u64,
    pub total_weight: f64,
}

/// One completed collection by a vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTrip {
    pub vehicle_id: String,
    pub zone_id: String,
    pub weight: f64,
    pub collection_date: NaiveDate,
}
