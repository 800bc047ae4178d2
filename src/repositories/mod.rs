//! Data access layer for the product ontology.
//!
//! Each repository owns the Cypher for one node kind. Node properties are
//! returned through map projections and deserialized straight into models.
//! Repositories never decide what a missing row means; that belongs to the
//! ontology service.

mod assignment;
mod component;
mod functionality;
mod incident;
mod product;
mod resolution;
mod schema;

pub use assignment::AssignmentRepository;
pub use component::ComponentRepository;
pub use functionality::FunctionalityRepository;
pub use incident::IncidentRepository;
pub use product::ProductRepository;
pub use resolution::ResolutionRepository;
pub use schema::{ClearReport, GraphStats, SchemaRepository, CONSTRAINTS};
