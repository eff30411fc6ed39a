pub mod waste_logs;

pub use waste_logs::{InsertOutcome, WasteLogRepository};
