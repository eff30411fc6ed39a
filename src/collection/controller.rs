use std::sync::Arc;

use anyhow::Context;

use crate::{
    db::{Completion, Database, InsertOutcome, NewWasteLog, WasteLog, WasteLogRepository},
    error::{CollectionError, CollectionResult},
    log_debug, log_error, log_info, log_warn,
    utils::Clock,
    validation::{require_vehicle_id, require_weight, require_worker_id, require_zone_id},
};

use super::state::ensure_can_complete;

const ENABLE_LOGS: bool = true;

/// Opens and closes waste logs.
///
/// Each transition runs as one task on the database thread inside a SQLite
/// transaction, so the duplicate-start and already-completed checks see the
/// same state the write lands on.
#[derive(Clone)]
pub struct CollectionController {
    db: Database,
    clock: Arc<dyn Clock>,
    actor: String,
}

impl CollectionController {
    pub fn new(db: Database, clock: Arc<dyn Clock>, actor: impl Into<String>) -> Self {
        Self {
            db,
            clock,
            actor: actor.into(),
        }
    }

    pub async fn start_collection(
        &self,
        zone_id: &str,
        vehicle_id: &str,
        worker_id: &str,
    ) -> CollectionResult<WasteLog> {
        require_zone_id(zone_id)?;
        require_vehicle_id(vehicle_id)?;
        require_worker_id(worker_id)?;

        let now = self.clock.now();
        let new_log = NewWasteLog {
            zone_id: zone_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            worker_id: worker_id.to_string(),
            collection_start_time: now,
            created_date: now,
            created_by: self.actor.clone(),
        };

        let result = self
            .db
            .execute(move |conn| -> CollectionResult<WasteLog> {
                let tx = conn
                    .transaction()
                    .context("failed to begin start transaction")?;
                let repo = WasteLogRepository::new(&tx);

                let conflict = || CollectionError::ActiveLogExists {
                    worker_id: new_log.worker_id.clone(),
                    zone_id: new_log.zone_id.clone(),
                    vehicle_id: new_log.vehicle_id.clone(),
                };

                if repo
                    .find_active(&new_log.worker_id, &new_log.zone_id, &new_log.vehicle_id)?
                    .is_some()
                {
                    return Err(conflict());
                }

                let log = match repo.insert(&new_log)? {
                    InsertOutcome::Created(log) => log,
                    InsertOutcome::ActiveLogConflict => return Err(conflict()),
                };

                tx.commit().context("failed to commit new waste log")?;
                Ok(log)
            })
            .await;

        match &result {
            Ok(log) => log_info!(
                "Collection {} started: zone={} vehicle={} worker={}",
                log.log_id,
                log.zone_id,
                log.vehicle_id,
                log.worker_id
            ),
            Err(err) => self.report_failure("start", err),
        }
        result
    }

    pub async fn end_collection(
        &self,
        log_id: i64,
        weight_collected: f64,
    ) -> CollectionResult<WasteLog> {
        require_weight(weight_collected)?;

        let now = self.clock.now();
        log_debug!("Ending collection {log_id} at {now}");
        let completion = Completion {
            collection_end_time: now,
            weight_collected,
            updated_date: now,
            updated_by: self.actor.clone(),
        };

        let result = self
            .db
            .execute(move |conn| -> CollectionResult<WasteLog> {
                let tx = conn
                    .transaction()
                    .context("failed to begin end transaction")?;
                let repo = WasteLogRepository::new(&tx);

                let log = repo
                    .find_by_id(log_id)?
                    .ok_or(CollectionError::LogNotFound(log_id))?;
                ensure_can_complete(&log)?;

                if completion.collection_end_time < log.collection_start_time {
                    return Err(CollectionError::InvalidTimeRange {
                        start: log.collection_start_time,
                        end: completion.collection_end_time,
                    });
                }

                if !repo.complete(log_id, &completion)? {
                    return Err(CollectionError::LogAlreadyCompleted(log_id));
                }

                let updated = repo
                    .find_by_id(log_id)?
                    .ok_or(CollectionError::LogNotFound(log_id))?;
                tx.commit().context("failed to commit waste log completion")?;
                Ok(updated)
            })
            .await;

        match &result {
            Ok(log) => log_info!(
                "Collection {} completed with {} kg",
                log.log_id,
                weight_collected
            ),
            Err(err) => self.report_failure("end", err),
        }
        result
    }

    pub async fn get_log(&self, log_id: i64) -> CollectionResult<WasteLog> {
        self.db
            .get_waste_log(log_id)
            .await?
            .ok_or(CollectionError::LogNotFound(log_id))
    }

    fn report_failure(&self, action: &str, err: &CollectionError) {
        if err.is_rejection() {
            log_warn!("Rejected {action} transition: {err}");
        } else {
            log_error!("Failed to {action} collection: {err:#}");
        }
    }
}
