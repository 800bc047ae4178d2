//! Incident model and SLA levels.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service level attached to an incident.
///
/// Stored and emitted as `SLA_<LEVEL>`; the bare level name is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlaLevel {
    #[serde(rename = "SLA_CRITICAL", alias = "CRITICAL")]
    Critical,
    #[serde(rename = "SLA_HIGH", alias = "HIGH")]
    High,
    #[serde(rename = "SLA_MEDIUM", alias = "MEDIUM")]
    Medium,
    #[serde(rename = "SLA_LOW", alias = "LOW")]
    Low,
}

impl SlaLevel {
    pub fn all() -> &'static [SlaLevel] {
        &[
            SlaLevel::Critical,
            SlaLevel::High,
            SlaLevel::Medium,
            SlaLevel::Low,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlaLevel::Critical => "SLA_CRITICAL",
            SlaLevel::High => "SLA_HIGH",
            SlaLevel::Medium => "SLA_MEDIUM",
            SlaLevel::Low => "SLA_LOW",
        }
    }
}

impl std::fmt::Display for SlaLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlaLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let level = upper.strip_prefix("SLA_").unwrap_or(&upper);
        match level {
            "CRITICAL" => Ok(SlaLevel::Critical),
            "HIGH" => Ok(SlaLevel::High),
            "MEDIUM" => Ok(SlaLevel::Medium),
            "LOW" => Ok(SlaLevel::Low),
            _ => Err(format!(
                "Invalid SLA level '{}'. Valid values: SLA_CRITICAL, SLA_HIGH, SLA_MEDIUM, SLA_LOW",
                s
            )),
        }
    }
}

/// An incident reported against a functionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub code: String,
    pub description: String,
    pub sla_level: SlaLevel,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed_and_bare() {
        assert_eq!("SLA_HIGH".parse::<SlaLevel>().unwrap(), SlaLevel::High);
        assert_eq!("HIGH".parse::<SlaLevel>().unwrap(), SlaLevel::High);
        assert_eq!("sla_low".parse::<SlaLevel>().unwrap(), SlaLevel::Low);
    }

    #[test]
    fn test_parse_rejects_unknown_level() {
        let err = "SLA_URGENT".parse::<SlaLevel>().unwrap_err();
        assert!(err.contains("SLA_URGENT"));
        assert!("SLA_".parse::<SlaLevel>().is_err());
    }

    #[test]
    fn test_serde_uses_prefixed_form() {
        assert_eq!(
            serde_json::to_value(SlaLevel::Critical).unwrap(),
            serde_json::json!("SLA_CRITICAL")
        );
        let bare: SlaLevel = serde_json::from_value(serde_json::json!("MEDIUM")).unwrap();
        assert_eq!(bare, SlaLevel::Medium);
    }

    #[test]
    fn test_display_matches_stored_form() {
        for level in SlaLevel::all() {
            assert_eq!(level.to_string().parse::<SlaLevel>().unwrap(), *level);
        }
    }
}
