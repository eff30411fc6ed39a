//! Identifier and measurement checks shared by request DTOs and the core.

use std::borrow::Cow;

use validator::ValidationError;

use crate::error::{CollectionError, CollectionResult};

pub const INVALID_ZONE_ID: &str = "Invalid Zone ID format. Must be like Z001.";
pub const INVALID_VEHICLE_ID: &str = "Invalid Vehicle ID format. Must be like RT123 or PT123.";
pub const INVALID_WORKER_ID: &str = "Invalid Worker ID format. Must be like W456.";
pub const INVALID_WEIGHT: &str = "Weight Collected must be a positive value.";

fn prefixed_digits(value: &str, prefixes: &[&str], digits: usize) -> bool {
    prefixes.iter().any(|prefix| {
        value.strip_prefix(prefix).is_some_and(|rest| {
            rest.len() == digits && rest.bytes().all(|b| b.is_ascii_digit())
        })
    })
}

/// `Z` followed by exactly three digits.
pub fn is_zone_id(value: &str) -> bool {
    prefixed_digits(value, &["Z"], 3)
}

/// `RT` or `PT` followed by exactly three digits.
pub fn is_vehicle_id(value: &str) -> bool {
    prefixed_digits(value, &["RT", "PT"], 3)
}

/// `W` followed by exactly three digits.
pub fn is_worker_id(value: &str) -> bool {
    prefixed_digits(value, &["W"], 3)
}

pub fn is_valid_weight(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn validate_zone_id(value: &str) -> Result<(), ValidationError> {
    if is_zone_id(value) {
        Ok(())
    } else {
        Err(rejected("zone_id", INVALID_ZONE_ID))
    }
}

pub fn validate_vehicle_id(value: &str) -> Result<(), ValidationError> {
    if is_vehicle_id(value) {
        Ok(())
    } else {
        Err(rejected("vehicle_id", INVALID_VEHICLE_ID))
    }
}

pub fn validate_worker_id(value: &str) -> Result<(), ValidationError> {
    if is_worker_id(value) {
        Ok(())
    } else {
        Err(rejected("worker_id", INVALID_WORKER_ID))
    }
}

pub(crate) fn require_zone_id(value: &str) -> CollectionResult<()> {
    require(is_zone_id(value), INVALID_ZONE_ID)
}

pub(crate) fn require_vehicle_id(value: &str) -> CollectionResult<()> {
    require(is_vehicle_id(value), INVALID_VEHICLE_ID)
}

pub(crate) fn require_worker_id(value: &str) -> CollectionResult<()> {
    require(is_worker_id(value), INVALID_WORKER_ID)
}

pub(crate) fn require_weight(value: f64) -> CollectionResult<()> {
    require(is_valid_weight(value), INVALID_WEIGHT)
}

fn require(ok: bool, message: &str) -> CollectionResult<()> {
    if ok {
        Ok(())
    } else {
        Err(CollectionError::InvalidInput(message.to_string()))
    }
}
