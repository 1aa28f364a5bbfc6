use crate::config::Config;
use crate::dedupe::dedupe_by_title;
use crate::error::Result;
use crate::fetcher::{Fetcher, ProviderFailure};
use crate::persist::save_books;
use crate::{logi, logok, logw};
use std::path::Path;

#[derive(Debug, Default)]
pub struct IngestSummary {
    pub fetched: usize,
    pub written: usize,
    pub failures: Vec<ProviderFailure>,
}

/// Fetch, dedupe by title, persist.
///
/// Provider failures are absorbed; only a failed write is returned as an error.
pub async fn ingest(fetcher: &Fetcher, query: &str, output: &Path) -> Result<IngestSummary> {
    logi(format!(
        "Fetching \"{}\" from {}",
        query.trim(),
        fetcher.provider_names().join(", ")
    ));
    let report = fetcher.fetch(query).await?;
    let fetched = report.records.len();

    let books = dedupe_by_title(report.records);
    if books.len() < fetched {
        logi(format!("Dropped {} duplicate titles", fetched - books.len()));
    }
    if books.is_empty() {
        logw(format!("No books found for \"{}\"; writing an empty list", query.trim()));
    }

    save_books(&books, output).await?;
    logok(format!("Saved {} books to {}", books.len(), output.display()));

    Ok(IngestSummary {
        fetched,
        written: books.len(),
        failures: report.failures,
    })
}

/// [`ingest`] with a fetcher built from `cfg`. `max_results` and `output`
/// override the configured values when given.
pub async fn run_ingest(
    cfg: &Config,
    query: &str,
    max_results: Option<usize>,
    output: Option<&Path>,
) -> Result<IngestSummary> {
    let mut fetcher = Fetcher::from_config(cfg)?;
    if let Some(max) = max_results {
        fetcher = fetcher.with_max_results(max);
    }
    let output = output.unwrap_or(cfg.output_path.as_path());
    ingest(&fetcher, query, output).await
}
