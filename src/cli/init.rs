//! Init command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;
use crate::di::FromRef;
use crate::migrations::run_migrations;
use crate::repositories::SchemaRepository;

use super::App;

impl App {
    /// Run the init command to apply pending migrations.
    pub async fn run_init(&self) -> Result<()> {
        let config = Config::load()?;
        tracing::info!(uri = %config.neo4j.uri, "Connecting to Neo4j");

        let ctx = Context::from_config(config).await?;
        tracing::info!("Connected to Neo4j");

        let result = run_migrations(&ctx).await?;

        if result.applied_migrations.is_empty() {
            tracing::info!(
                version = result.current_version,
                "Schema already up to date, no migrations needed"
            );
        } else {
            tracing::info!(
                previous = result.previous_version,
                current = result.current_version,
                applied = ?result.applied_migrations,
                "Migrations complete"
            );
        }

        let schema = SchemaRepository::from_ref(&ctx);
        let history = schema.get_applied_migrations().await?;
        let constraints = schema.constraint_names().await?;
        tracing::info!(
            migrations = ?history,
            constraints = ?constraints,
            "Schema ready"
        );

        Ok(())
    }
}
