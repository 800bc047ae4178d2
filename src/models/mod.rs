//! Domain models for the product ontology.

mod component;
mod functionality;
mod incident;
mod product;
mod resolution;
mod views;

pub use component::Component;
pub use functionality::Functionality;
pub use incident::{Incident, SlaLevel};
pub use product::{Product, ProductUpdate, UpdateOutcome};
pub use resolution::{parse_resolution_date, Resolution};
pub use views::{
    ComponentDetails, FunctionalityDetails, IncidentRecord, ProductDetails, ProductSummary,
};

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp the way it is stored on nodes.
///
/// Fixed width (microseconds, `Z` suffix) so lexical order is chronological.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time in stored form.
pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(&whole), "2024-01-15T10:30:00.000000Z");
        assert_eq!(now_timestamp().len(), format_timestamp(&whole).len());
    }

    #[test]
    fn test_timestamp_order_is_chronological() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }
}
