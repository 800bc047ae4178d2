//! Component model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A technical component that implements one or more functionalities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
