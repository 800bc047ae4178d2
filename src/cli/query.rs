//! Query command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::graph::{Graph, QueryExt};

use super::App;

impl App {
    /// Run a Cypher statement and print every returned row as JSON.
    pub async fn run_query(&self, cypher: &str) -> Result<()> {
        let config = Config::load()?;
        config.validate()?;
        let graph = Graph::connect(&config.neo4j).await?;

        tracing::info!(cypher = %cypher, "Executing query");
        let rows = graph.query(cypher).fetch_all().await?;

        println!("Records returned: {}", rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            println!("{}. {}", i + 1, serde_json::to_string(&row.into_inner())?);
        }
        Ok(())
    }
}
