pub mod aggregate;
pub mod commands;
mod types;

pub use types::{VehicleTrip, ZoneDailySummary};

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    db::Database,
    error::{CollectionError, CollectionResult},
    log_info, log_warn,
    utils::Clock,
    validation::{require_vehicle_id, require_zone_id},
};

const ENABLE_LOGS: bool = true;

/// Read-only reports over completed collections.
#[derive(Clone)]
pub struct ReportService {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Current UTC calendar date.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    pub async fn zone_report(
        &self,
        zone_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CollectionResult<Vec<ZoneDailySummary>> {
        ensure_date_range(start_date, end_date)?;
        require_zone_id(zone_id)?;

        let logs = self
            .db
            .zone_logs_between(zone_id, start_date, end_date)
            .await?;
        let rows = aggregate::summarize_zone(zone_id, &logs);

        log_info!(
            "Zone report for {zone_id} ({start_date}..={end_date}): {} logs, {} days",
            logs.len(),
            rows.len()
        );
        Ok(rows)
    }

    pub async fn vehicle_report(
        &self,
        vehicle_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> CollectionResult<Vec<VehicleTrip>> {
        ensure_date_range(start_date, end_date)?;
        require_vehicle_id(vehicle_id)?;

        let logs = self
            .db
            .vehicle_logs_between(vehicle_id, start_date, end_date)
            .await?;
        let trips = aggregate::vehicle_trips(&logs);

        log_info!(
            "Vehicle report for {vehicle_id} ({start_date}..={end_date}): {} trips",
            trips.len()
        );
        Ok(trips)
    }
}

fn ensure_date_range(start: NaiveDate, end: NaiveDate) -> CollectionResult<()> {
    if start > end {
        log_warn!("Rejected report range {start}..={end}");
        return Err(CollectionError::InvalidDateRange { start, end });
    }
    Ok(())
}
