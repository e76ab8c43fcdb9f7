//! Bounds validation utilities

use crate::error::ValidationError;
use crate::limits::{MAX_TIMESTAMP, MIN_TIMESTAMP};

/// Check if timestamp is within acceptable bounds
pub(crate) fn validate_timestamp_bounds(value: i64) -> Result<(), ValidationError> {
    if !(MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&value) {
        return Err(ValidationError::TimestampOutOfBounds {
            value,
            min: MIN_TIMESTAMP,
            max: MAX_TIMESTAMP,
        });
    }
    Ok(())
}

/// Apply clock skew to a timestamp with overflow protection
pub(crate) fn apply_clock_skew(
    timestamp: i64,
    skew_seconds: u64,
    add: bool,
) -> Result<i64, ValidationError> {
    let skew_i64 = i64::try_from(skew_seconds).map_err(|_| ValidationError::TimestampOverflow)?;
    if add {
        timestamp.checked_add(skew_i64)
    } else {
        timestamp.checked_sub(skew_i64)
    }
    .ok_or(ValidationError::TimestampOverflow)
}
