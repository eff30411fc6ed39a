pub mod waste_log;

pub use waste_log::{Completion, NewWasteLog, WasteLog};
