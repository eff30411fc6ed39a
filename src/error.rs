use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Failures surfaced by the collection lifecycle and the report service.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error(
        "An active collection log already exists for Worker ID: {worker_id}, \
         Zone ID: {zone_id}, Vehicle ID: {vehicle_id}"
    )]
    ActiveLogExists {
        worker_id: String,
        zone_id: String,
        vehicle_id: String,
    },

    #[error("Waste Log with ID {0} not found.")]
    LogNotFound(i64),

    #[error("Waste Log with ID {0} has already been completed.")]
    LogAlreadyCompleted(i64),

    #[error("Collection End Time cannot be before start time.")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Start date cannot be after end date.")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl CollectionError {
    /// Business-rule rejections, as opposed to infrastructure faults.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, CollectionError::Store(_))
    }
}

pub type CollectionResult<T> = Result<T, CollectionError>;
