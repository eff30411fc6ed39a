//! Waste-log records as stored in the `waste_logs` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WasteLog {
    pub log_id: i64,
    pub zone_id: String,
    pub vehicle_id: String,
    pub worker_id: String,
    pub collection_start_time: DateTime<Utc>,
    pub collection_end_time: Option<DateTime<Utc>>,
    pub weight_collected: Option<f64>,
    pub created_date: DateTime<Utc>,
    pub created_by: String,
    pub updated_date: DateTime<Utc>,
    pub updated_by: String,
}

impl WasteLog {
    /// A log stays active until an end time is recorded.
    pub fn is_active(&self) -> bool {
        self.collection_end_time.is_none()
    }
}

/// Fields supplied when a collection starts; the id comes from the store.
#[derive(Debug, Clone)]
pub struct NewWasteLog {
    pub zone_id: String,
    pub vehicle_id: String,
    pub worker_id: String,
    pub collection_start_time: DateTime<Utc>,
    pub created_date: DateTime<Utc>,
    pub created_by: String,
}

/// Values written when a collection is closed.
#[derive(Debug, Clone)]
pub struct Completion {
    pub collection_end_time: DateTime<Utc>,
    pub weight_collected: f64,
    pub updated_date: DateTime<Utc>,
    pub updated_by: String,
}
