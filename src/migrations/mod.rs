//! Schema migrations with version tracking.
//!
//! Migrations are:
//! - **Idempotent**: `IF NOT EXISTS` everywhere, so a retried run is harmless
//! - **Forward-only**: no rollback; fix mistakes with a later migration
//! - **Version-tracked**: the applied version lives on a `(:SchemaVersion {id: 1})` node
//!
//! Neo4j refuses schema changes and data writes in the same transaction, so
//! each statement runs on its own and the version is recorded afterwards.

mod m001_constraints;
mod m002_indexes;
mod runner;
mod traits;

pub use m001_constraints::M001Constraints;
pub use m002_indexes::M002Indexes;
pub use runner::{run_migrations, MigrationResult};
pub use traits::{Migration, Register};

/// All migrations in version order.
pub fn create_register() -> Register {
    Register::new()
        .register(M001Constraints)
        .register(M002Indexes)
}
