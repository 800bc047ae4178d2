//! News article CSV pipeline: load, validate, clean, summarize.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AppError;

pub const REQUIRED_COLUMNS: &[&str] = &["title", "date", "text"];

const NO_TITLE: &str = "[No Title]";
const NO_CONTENT: &str = "[No Content]";
const MIN_TEXT_CHARS: usize = 10;
const SAMPLE_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub date: String,
    pub text: String,
}

/// Parsed CSV: the header row plus the required columns of every record.
#[derive(Debug, Clone)]
pub struct NewsDataset {
    pub columns: Vec<String>,
    pub articles: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsSummary {
    pub total_articles: usize,
    pub columns: Vec<String>,
    /// Empty values per required column.
    pub missing_values: BTreeMap<String, usize>,
    pub sample_articles: Vec<NewsArticle>,
}

/// Loads news CSVs from a URL or a local path.
#[derive(Debug, Clone, Default)]
pub struct NewsProcessor {
    client: reqwest::Client,
}

impl NewsProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches and parses the dataset. Anything that is not an http(s) URL
    /// is read as a file path.
    pub async fn load(&self, source: &str) -> Result<NewsDataset, AppError> {
        tracing::info!(source = %source, "Loading news data");

        let body = if source.starts_with("http://") || source.starts_with("https://") {
            self.fetch(source).await?
        } else {
            tokio::fs::read_to_string(source)
                .await
                .map_err(|e| AppError::Data(format!("failed to read {}: {}", source, e)))?
        };

        let dataset = parse(&body)?;
        tracing::info!(
            rows = dataset.articles.len(),
            columns = dataset.columns.len(),
            "News data validated"
        );
        Ok(dataset)
    }

    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Data(format!("failed to download {}: {}", url, e)))?;

        response
            .text()
            .await
            .map_err(|e| AppError::Data(format!("failed to read body of {}: {}", url, e)))
    }
}

/// Parses CSV text, requiring the `title`, `date` and `text` columns and at
/// least one record.
pub fn parse(body: &str) -> Result<NewsDataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Data(format!("invalid CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.iter().any(|c| c == required))
        .collect();
    if !missing.is_empty() {
        tracing::error!(available = ?columns, "News data missing required columns");
        return Err(AppError::Data(format!(
            "News data missing required columns: {}",
            missing.join(", ")
        )));
    }

    let index = |name: &str| columns.iter().position(|c| c == name).unwrap_or_default();
    let (title_idx, date_idx, text_idx) = (index("title"), index("date"), index("text"));

    let mut articles = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::Data(format!("invalid CSV record: {}", e)))?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        articles.push(NewsArticle {
            title: field(title_idx),
            date: field(date_idx),
            text: field(text_idx),
        });
    }

    if articles.is_empty() {
        return Err(AppError::Data("News data is empty".into()));
    }

    Ok(NewsDataset { columns, articles })
}

/// Trims titles and texts, fills blanks with placeholders and drops
/// articles whose text is too short to be useful.
pub fn clean(dataset: NewsDataset) -> NewsDataset {
    let articles: Vec<NewsArticle> = dataset
        .articles
        .into_iter()
        .map(|article| {
            let title = article.title.trim();
            let text = article.text.trim();
            NewsArticle {
                title: if title.is_empty() { NO_TITLE } else { title }.to_string(),
                date: article.date,
                text: if text.is_empty() { NO_CONTENT } else { text }.to_string(),
            }
        })
        .filter(|article| article.text != NO_CONTENT && article.text.chars().count() > MIN_TEXT_CHARS)
        .collect();

    tracing::info!(remaining = articles.len(), "Text cleaning completed");
    NewsDataset {
        columns: dataset.columns,
        articles,
    }
}

pub fn summarize(dataset: &NewsDataset) -> NewsSummary {
    let mut missing_values = BTreeMap::new();
    for column in REQUIRED_COLUMNS {
        let count = dataset
            .articles
            .iter()
            .filter(|a| {
                let value = match *column {
                    "title" => &a.title,
                    "date" => &a.date,
                    _ => &a.text,
                };
                value.trim().is_empty()
            })
            .count();
        missing_values.insert(column.to_string(), count);
    }

    NewsSummary {
        total_articles: dataset.articles.len(),
        columns: dataset.columns.clone(),
        missing_values,
        sample_articles: dataset.articles.iter().take(SAMPLE_SIZE).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
id,title,date,text
1,  Markets rally ,2024-01-02,  Stocks closed higher across the board today.
2,,2024-01-03,Central bank holds interest rates steady.
3,Short,2024-01-04,Too short
4,Blank,2024-01-05,
";

    #[test]
    fn test_parse_reads_required_columns() {
        let dataset = parse(CSV).unwrap();
        assert_eq!(dataset.columns, vec!["id", "title", "date", "text"]);
        assert_eq!(dataset.articles.len(), 4);
        assert_eq!(dataset.articles[0].date, "2024-01-02");
    }

    #[test]
    fn test_parse_rejects_missing_columns() {
        let err = parse("title,body\nA,B\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Data processing error: News data missing required columns: date, text"
        );
    }

    #[test]
    fn test_parse_rejects_empty_data() {
        let err = parse("title,date,text\n").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_clean_trims_fills_and_filters() {
        let cleaned = clean(parse(CSV).unwrap());

        assert_eq!(cleaned.articles.len(), 2);
        assert_eq!(cleaned.articles[0].title, "Markets rally");
        assert_eq!(
            cleaned.articles[0].text,
            "Stocks closed higher across the board today."
        );
        assert_eq!(cleaned.articles[1].title, "[No Title]");
    }

    #[test]
    fn test_summarize_counts_and_samples() {
        let dataset = parse(CSV).unwrap();
        let summary = summarize(&dataset);

        assert_eq!(summary.total_articles, 4);
        assert_eq!(summary.missing_values["title"], 1);
        assert_eq!(summary.missing_values["text"], 1);
        assert_eq!(summary.sample_articles.len(), 3);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let dataset = NewsProcessor::new()
            .load(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(dataset.articles.len(), 4);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = NewsProcessor::new().load("/nonexistent/news.csv").await;
        assert!(matches!(result, Err(AppError::Data(_))));
    }
}
