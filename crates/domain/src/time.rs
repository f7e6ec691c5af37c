//! Wall-clock helpers for state change records.

use chrono::{DateTime, SecondsFormat, Utc};

/// When a state change happened, in UTC.
pub type Timestamp = DateTime<Utc>;

#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// RFC 3339 with millisecond precision, as written to the change log.
#[must_use]
pub fn to_rfc3339(at: &Timestamp) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
