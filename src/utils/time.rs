//! Time helpers
//!
//! Created-at stamps are Unix millis; export stamps are RFC 3339.

use chrono::Utc;

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current time as an ISO 8601 / RFC 3339 string (used in export envelopes)
pub fn iso_now() -> String {
    Utc::now().to_rfc3339()
}
