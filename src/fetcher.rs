use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::providers::{self, Provider, ProviderHttp};
use crate::record::BookRecord;
use crate::{logi, logok, logw};
use futures::future::join_all;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: String,
    pub reason: String,
}

/// Records from every provider that answered, in provider order, plus the
/// providers that were skipped.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub records: Vec<BookRecord>,
    pub failures: Vec<ProviderFailure>,
}

pub struct Fetcher {
    providers: Vec<Box<dyn Provider>>,
    max_results: usize,
}

impl Fetcher {
    pub fn new(providers: Vec<Box<dyn Provider>>, max_results: usize) -> Self {
        Self {
            providers,
            max_results,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let http = ProviderHttp::new(ProviderHttp::build_client()?, cfg.timeout(), cfg.retry);
        let providers = providers::from_config(cfg, &http)?;
        Ok(Self::new(providers, cfg.max_results_per_provider))
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Queries every provider and concatenates their records.
    ///
    /// Providers run concurrently but results are merged in configured order.
    /// A failing provider contributes nothing; only invalid input is an error.
    pub async fn fetch(&self, query: &str) -> Result<FetchReport> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::InvalidQuery("query must not be empty".into()));
        }
        if self.max_results == 0 {
            return Err(PipelineError::InvalidQuery("max_results must be > 0".into()));
        }

        let results = join_all(
            self.providers
                .iter()
                .map(|provider| provider.fetch(query, self.max_results)),
        )
        .await;

        let mut report = FetchReport::default();
        for (provider, result) in self.providers.iter().zip(results) {
            match result {
                Ok(records) => {
                    logok(format!("{}: {} records", provider.name(), records.len()));
                    report.records.extend(records);
                }
                Err(err) => {
                    logw(format!("Skipping {}: {}", provider.name(), err));
                    let reason = match err {
                        PipelineError::ProviderUnavailable { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    report.failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        reason,
                    });
                }
            }
        }

        logi(format!(
            "Fetched {} records from {} providers ({} failed)",
            report.records.len(),
            self.providers.len(),
            report.failures.len()
        ));
        Ok(report)
    }
}
