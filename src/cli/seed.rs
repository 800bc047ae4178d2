//! Seed command handler.

use color_eyre::Result;
use serde_json::json;

use crate::config::Config;
use crate::context::Context;
use crate::data::seed_sample_data;
use crate::di::FromRef;
use crate::services::OntologyManager;

use super::App;

impl App {
    /// Load the demonstration dataset, optionally clearing the graph first,
    /// and print the resulting statistics.
    pub async fn run_seed(&self, clear: bool) -> Result<()> {
        let config = Config::load()?;
        let ctx = Context::from_config(config).await?;
        let manager = OntologyManager::from_ref(&ctx);

        if clear {
            let report = manager.clear_all().await?;
            tracing::info!(deleted = report.total(), ?report, "Cleared existing data");
        }

        let summary = seed_sample_data(&manager).await?;
        let products = manager.get_all_products_summary().await?;
        let stats = manager.stats().await?;

        let output = json!({
            "loaded": summary,
            "products": products
                .iter()
                .map(|p| json!({
                    "code": p.product.code,
                    "name": p.product.name,
                    "functionality_count": p.functionality_count,
                    "functionalities": p.functionalities,
                }))
                .collect::<Vec<_>>(),
            "graph": stats,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(())
    }
}
