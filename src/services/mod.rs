//! Business logic services.
//!
//! Services orchestrate repositories and enforce the ontology's integrity
//! rules, using the `FromContext` derive macro for dependency injection.

mod ontology;
pub mod validation;

pub use ontology::{BulkFailure, BulkOutcome, OntologyManager};
pub use validation::{Page, PageInfo};
