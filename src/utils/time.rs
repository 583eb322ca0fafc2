//! Timestamp helpers

use chrono::Utc;

/// Current Unix timestamp in milliseconds
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}
