use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::WasteLog,
    http::{ApiError, RestResponse, ValidatedJson},
    validation::{validate_vehicle_id, validate_worker_id, validate_zone_id},
    AppState,
};

pub const LOG_RECORDED: &str = "Waste Collection Log Recorded Successfully";
pub const LOG_COMPLETED: &str = "Waste Collection Log Completed Successfully";
pub const LOG_RETRIEVED: &str = "Waste Collection Log Retrieved Successfully";

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartCollectionRequest {
    #[validate(
        length(min = 1, message = "Zone ID cannot be empty."),
        custom(function = "validate_zone_id")
    )]
    pub zone_id: String,
    #[validate(
        length(min = 1, message = "Vehicle ID cannot be empty."),
        custom(function = "validate_vehicle_id")
    )]
    pub vehicle_id: String,
    #[validate(
        length(min = 1, message = "Worker ID cannot be empty."),
        custom(function = "validate_worker_id")
    )]
    pub worker_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EndCollectionRequest {
    #[validate(range(min = 1, message = "Log ID must be a positive number."))]
    pub log_id: i64,
    #[validate(range(
        exclusive_min = 0.0,
        message = "Weight Collected must be a positive value."
    ))]
    pub weight_collected: f64,
}

pub async fn start_collection(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<StartCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let log = state
        .collections
        .start_collection(&request.zone_id, &request.vehicle_id, &request.worker_id)
        .await?;
    Ok((StatusCode::CREATED, Json(RestResponse::ok(LOG_RECORDED, log))))
}

pub async fn end_collection(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EndCollectionRequest>,
) -> Result<Json<RestResponse<WasteLog>>, ApiError> {
    let log = state
        .collections
        .end_collection(request.log_id, request.weight_collected)
        .await?;
    Ok(Json(RestResponse::ok(LOG_COMPLETED, log)))
}

pub async fn get_log(
    State(state): State<AppState>,
    log_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<RestResponse<WasteLog>>, ApiError> {
    let Path(log_id) = log_id?;
    let log = state.collections.get_log(log_id).await?;
    Ok(Json(RestResponse::ok(LOG_RETRIEVED, log)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{http::ErrorResponse, testing::TestApp};
    use anyhow::{anyhow, Result};
    use axum::response::Response;
    use serde::de::DeserializeOwned;

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn start_request(zone: &str, vehicle: &str, worker: &str) -> StartCollectionRequest {
        StartCollectionRequest {
            zone_id: zone.into(),
            vehicle_id: vehicle.into(),
            worker_id: worker.into(),
        }
    }

    #[tokio::test]
    async fn start_returns_created_envelope() -> Result<()> {
        let app = TestApp::new()?;

        let response = start_collection(
            State(app.state.clone()),
            ValidatedJson(start_request("Z001", "RT001", "W001")),
        )
        .await
        .map_err(|err| anyhow!("{err:?}"))?
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let payload: RestResponse<WasteLog> = decode(response).await?;
        assert!(payload.success);
        assert_eq!(payload.message, LOG_RECORDED);
        assert_eq!(payload.data.zone_id, "Z001");
        assert!(payload.data.is_active());
        Ok(())
    }

    #[tokio::test]
    async fn second_start_conflicts() -> Result<()> {
        let app = TestApp::new()?;
        start_collection(
            State(app.state.clone()),
            ValidatedJson(start_request("Z001", "RT001", "W001")),
        )
        .await
        .map_err(|err| anyhow!("{err:?}"))?;

        let err = start_collection(
            State(app.state.clone()),
            ValidatedJson(start_request("Z001", "RT001", "W001")),
        )
        .await
        .err()
        .ok_or_else(|| anyhow!("expected conflict"))?;

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let payload: ErrorResponse = decode(response).await?;
        assert_eq!(payload.status, 409);
        Ok(())
    }

    #[tokio::test]
    async fn end_then_end_again() -> Result<()> {
        let app = TestApp::new()?;
        let log = app.state.collections.start_collection("Z001", "RT001", "W001").await?;
        let request = EndCollectionRequest {
            log_id: log.log_id,
            weight_collected: 45.5,
        };

        let Json(done) = end_collection(State(app.state.clone()), ValidatedJson(request.clone()))
            .await
            .map_err(|err| anyhow!("{err:?}"))?;
        let again = end_collection(State(app.state.clone()), ValidatedJson(request))
            .await
            .err()
            .ok_or_else(|| anyhow!("expected already completed"))?;

        assert_eq!(done.message, LOG_COMPLETED);
        assert_eq!(done.data.weight_collected, Some(45.5));
        assert_eq!(again.status(), StatusCode::CONFLICT);
        assert_eq!(
            again.message(),
            format!("Waste Log with ID {} has already been completed.", log.log_id)
        );
        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_log_is_not_found() -> Result<()> {
        let app = TestApp::new()?;

        let err = get_log(State(app.state.clone()), Ok(Path(41)))
            .await
            .err()
            .ok_or_else(|| anyhow!("expected not found"))?;

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[test]
    fn start_request_rules() {
        assert!(start_request("Z001", "PT123", "W456").validate().is_ok());

        let errors = start_request("Z01", "BUS1", "").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("zone_id"));
        assert!(fields.contains_key("vehicle_id"));
        assert!(fields.contains_key("worker_id"));
    }

    #[test]
    fn end_request_rules() {
        let ok = EndCollectionRequest {
            log_id: 1,
            weight_collected: 0.5,
        };
        let zero_weight = EndCollectionRequest {
            log_id: 1,
            weight_collected: 0.0,
        };
        let bad_id = EndCollectionRequest {
            log_id: 0,
            weight_collected: 2.0,
        };

        assert!(ok.validate().is_ok());
        assert!(zero_weight.validate().is_err());
        assert!(bad_id.validate().is_err());
    }

    #[test]
    fn end_request_uses_camel_case() {
        let request: EndCollectionRequest =
            serde_json::from_str(r#"{"logId":3,"weightCollected":12.5}"#).unwrap();

        assert_eq!(request.log_id, 3);
        assert_eq!(request.weight_collected, 12.5);
    }
}
