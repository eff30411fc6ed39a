//! HTTP surface for the waste-log service.

mod error;
mod extract;
mod pagination;
mod response;

pub use error::{ApiError, ErrorResponse, UNEXPECTED_ERROR};
pub use extract::ValidatedJson;
pub use pagination::{Page, PageRequest};
pub use response::RestResponse;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;

use crate::{collection, log_info, log_warn, reports, AppState};

const ENABLE_LOGS: bool = true;

pub const BASE_PATH: &str = "/wastewise/admin/wastelogs";

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/start", post(collection::commands::start_collection))
        .route("/end", put(collection::commands::end_collection))
        .route("/:log_id", get(collection::commands::get_log))
        .route("/reports/zone/:zone_id", get(reports::commands::zone_report))
        .route(
            "/reports/vehicle/:vehicle_id",
            get(reports::commands::vehicle_report),
        );

    Router::new().nest(BASE_PATH, routes).with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState, bind_address: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    log_info!("Listening on http://{}{}", listener.local_addr()?, BASE_PATH);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log_warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    log_info!("Shutdown signal received");
}
