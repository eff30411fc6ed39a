use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    http::{ApiError, Page, PageRequest, RestResponse},
    AppState,
};

use super::{VehicleTrip, ZoneDailySummary};

pub const ZONE_REPORT_GENERATED: &str = "Zone report generated successfully.";
pub const VEHICLE_REPORT_GENERATED: &str = "Vehicle report generated successfully.";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl ReportQuery {
    fn page_request(&self, state: &AppState) -> PageRequest {
        PageRequest::resolve(
            self.page,
            self.size,
            state.settings.default_page_size,
            state.settings.max_page_size,
        )
    }
}

fn required(value: Option<NaiveDate>, name: &str) -> Result<NaiveDate, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("Required parameter '{name}' is missing.")))
}

pub async fn zone_report(
    State(state): State<AppState>,
    zone_id: Result<Path<String>, PathRejection>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<RestResponse<Page<ZoneDailySummary>>>, ApiError> {
    let Path(zone_id) = zone_id?;
    let Query(query) = query?;
    let start_date = required(query.start_date, "startDate")?;
    let end_date = required(query.end_date, "endDate")?;

    let rows = state
        .reports
        .zone_report(&zone_id, start_date, end_date)
        .await?;
    let page = Page::slice(rows, query.page_request(&state));

    let message = if page.is_empty() {
        format!(
            "No active completed logs found for zone ID: {zone_id} between {start_date} and {end_date}."
        )
    } else {
        ZONE_REPORT_GENERATED.to_string()
    };
    Ok(Json(RestResponse::ok(message, page)))
}

/// Missing dates default to today.
pub async fn vehicle_report(
    State(state): State<AppState>,
    vehicle_id: Result<Path<String>, PathRejection>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<RestResponse<Page<VehicleTrip>>>, ApiError> {
    let Path(vehicle_id) = vehicle_id?;
    let Query(query) = query?;
    let today = state.reports.today();
    let start_date = query.start_date.unwrap_or(today);
    let end_date = query.end_date.unwrap_or(today);

    let trips = state
        .reports
        .vehicle_report(&vehicle_id, start_date, end_date)
        .await?;
    let page = Page::slice(trips, query.page_request(&state));

    let message = if page.is_empty() {
        format!(
            "No active completed logs found for vehicle ID: {vehicle_id} in the period {start_date} to {end_date}. Returning empty list."
        )
    } else {
        VEHICLE_REPORT_GENERATED.to_string()
    };
    Ok(Json(RestResponse::ok(message, page)))
}
