pub mod collection;
pub mod db;
pub mod error;
pub mod http;
pub mod reports;
pub mod settings;
pub mod utils;
pub mod validation;

use std::sync::Arc;

use log::{info, warn};

use collection::CollectionController;
use db::Database;
use reports::ReportService;
use settings::Settings;
use utils::{Clock, SystemClock};

/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub collections: CollectionController,
    pub reports: ReportService,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: Database, clock: Arc<dyn Clock>, settings: Settings) -> Self {
        Self {
            collections: CollectionController::new(
                db.clone(),
                clock.clone(),
                settings.audit_actor.clone(),
            ),
            reports: ReportService::new(db, clock),
            settings: Arc::new(settings),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaulting to info.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("WasteLog service starting up...");

    let config_path = Settings::config_path();
    let settings = Settings::load(&config_path)?;
    info!(
        "Loaded settings from {} (database: {})",
        config_path.display(),
        settings.database_path.display()
    );

    let database = Database::new(settings.database_path.clone())?;

    let in_progress = database.count_active_logs().await?;
    if in_progress > 0 {
        warn!("{in_progress} collections are still in progress from an earlier run");
    }

    let bind_address = settings.bind_address.clone();
    let state = AppState::new(database, Arc::new(SystemClock), settings);
    http::serve(state, &bind_address).await
}
