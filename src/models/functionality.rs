//! Functionality model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A functionality node. Products and components are assigned to it; incidents
/// hang off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Functionality {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
