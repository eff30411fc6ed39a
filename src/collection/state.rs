use crate::{
    db::WasteLog,
    error::{CollectionError, CollectionResult},
};

/// Lifecycle position of a waste log. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Active,
    Completed,
}

impl LogStatus {
    pub fn of(log: &WasteLog) -> Self {
        if log.is_active() {
            LogStatus::Active
        } else {
            LogStatus::Completed
        }
    }
}

/// Only an active log may move to `Completed`.
pub fn ensure_can_complete(log: &WasteLog) -> CollectionResult<()> {
    match LogStatus::of(log) {
        LogStatus::Active => Ok(()),
        LogStatus::Completed => Err(CollectionError::LogAlreadyCompleted(log.log_id)),
    }
}
