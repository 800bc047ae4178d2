//! Process command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::data::news::{clean, summarize};
use crate::data::NewsProcessor;

use super::App;

impl App {
    /// Run the news pipeline: load, validate, clean, then print the summary.
    pub async fn run_process(&self, url: Option<String>) -> Result<()> {
        let config = Config::load()?;
        let source = url.unwrap_or(config.data.news_url);

        let dataset = NewsProcessor::new().load(&source).await?;
        let raw_rows = dataset.articles.len();

        let cleaned = clean(dataset);
        tracing::info!(
            raw = raw_rows,
            cleaned = cleaned.articles.len(),
            dropped = raw_rows - cleaned.articles.len(),
            "News data processed"
        );

        println!("{}", serde_json::to_string_pretty(&summarize(&cleaned))?);
        Ok(())
    }
}
