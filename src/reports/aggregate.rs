use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::db::WasteLog;

use super::types::{VehicleTrip, ZoneDailySummary};

/// Weight of a log that has been closed; active logs yield `None`.
fn completed_weight(log: &WasteLog) -> Option<f64> {
    log.collection_end_time.and(log.weight_collected)
}

fn collection_date(log: &WasteLog) -> NaiveDate {
    log.collection_start_time.date_naive()
}

#[derive(Default)]
struct DayTotals<'a> {
    vehicles: BTreeSet<&'a str>,
    weight: f64,
}

/// Group completed logs by the UTC date they started on.
pub fn summarize_zone(zone_id: &str, logs: &[WasteLog]) -> Vec<ZoneDailySummary> {
    let mut days: BTreeMap<NaiveDate, DayTotals<'_>> = BTreeMap::new();

    for log in logs {
        let Some(weight) = completed_weight(log) else {
            continue;
        };
        let totals = days.entry(collection_date(log)).or_default();
        totals.vehicles.insert(log.vehicle_id.as_str());
        totals.weight += weight;
    }

    days.into_iter()
        .map(|(date, totals)| ZoneDailySummary {
            zone_id: zone_id.to_string(),
            date,
            vehicle_count: totals.vehicles.len() as u64,
            total_weight: totals.weight,
        })
        .collect()
}

/// One row per completed log, ordered by date then start time.
pub fn vehicle_trips(logs: &[WasteLog]) -> Vec<VehicleTrip> {
    let mut completed: Vec<&WasteLog> = logs
        .iter()
        .filter(|log| completed_weight(log).is_some())
        .collect();
    completed.sort_by_key(|log| (collection_date(log), log.collection_start_time, log.log_id));

    completed
        .into_iter()
        .filter_map(|log| {
            Some(VehicleTrip {
                vehicle_id: log.vehicle_id.clone(),
                zone_id: log.zone_id.clone(),
                weight: completed_weight(log)?,
                collection_date: collection_date(log),
            })
        })
        .collect()
}
