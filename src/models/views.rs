//! Composite read models returned by traversal queries.

use serde::{Deserialize, Serialize};

use super::{Component, Functionality, Incident, Product, Resolution};

/// A product with everything reachable through its functionalities.
///
/// Related items are parallel collections, not nested per functionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetails {
    pub product: Product,
    pub functionalities: Vec<Functionality>,
    pub incidents: Vec<Incident>,
    pub resolutions: Vec<Resolution>,
}

/// A functionality with the products and components assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionalityDetails {
    pub functionality: Functionality,
    pub products: Vec<Product>,
    pub components: Vec<Component>,
    pub incidents: Vec<Incident>,
    pub resolutions: Vec<Resolution>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDetails {
    pub component: Component,
    pub functionalities: Vec<Functionality>,
    pub incidents: Vec<Incident>,
    pub resolutions: Vec<Resolution>,
}

/// One row of the product overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub functionalities: Vec<String>,
    pub functionality_count: usize,
}

/// An incident together with its resolution, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRecord {
    #[serde(flatten)]
    pub incident: Incident,
    /// Owning functionality; filled for listings that span functionalities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functionality_code: Option<String>,
    pub resolution: Option<Resolution>,
}
