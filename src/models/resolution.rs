//! Resolution model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an incident was resolved. At most one per incident, keyed by the
/// incident's code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub incident_code: String,
    pub procedure: String,
    pub resolution_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Parses a resolution date.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00Z`, `2024-01-15T10:30:00+02:00`) and
/// naive ISO-8601 date-times, which are read as UTC.
pub fn parse_resolution_date(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            format!(
                "Invalid resolution date '{}'. Expected ISO-8601, e.g. 2024-01-15T10:30:00Z",
                text
            )
        })
}
