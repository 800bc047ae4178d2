//! Migration runner with version tracking.

use crate::context::Context;
use crate::di::FromRef;
use crate::error::AppError;
use crate::repositories::SchemaRepository;

use super::create_register;

/// Result of running migrations.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub previous_version: u32,
    pub current_version: u32,
    pub applied_migrations: Vec<String>,
}

/// Applies every migration above the recorded schema version.
///
/// The version is recorded after each successful migration, so a failure
/// leaves the database at the last good version.
pub async fn run_migrations(ctx: &Context) -> Result<MigrationResult, AppError> {
    let schema = SchemaRepository::from_ref(ctx);
    let register = create_register();

    let previous_version = schema.get_schema_version().await?;
    let mut current_version = previous_version;
    let mut applied = Vec::new();

    for migration in register.pending(previous_version) {
        tracing::info!(
            id = migration.id(),
            version = migration.version(),
            "Applying migration: {}",
            migration.description()
        );

        if let Err(e) = migration.up(&ctx.graph).await {
            tracing::error!(id = migration.id(), error = %e, "Migration failed");
            return Err(e);
        }

        schema
            .record_migration(migration.version(), migration.id())
            .await?;
        current_version = migration.version();
        applied.push(migration.id().to_string());
    }

    Ok(MigrationResult {
        previous_version,
        current_version,
        applied_migrations: applied,
    })
}
