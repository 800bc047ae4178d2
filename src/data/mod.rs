//! Data loading: the CSV news pipeline and the demonstration dataset.

pub mod news;
pub mod sample;

pub use news::{NewsArticle, NewsDataset, NewsProcessor, NewsSummary};
pub use sample::{seed_sample_data, SeedSummary};
