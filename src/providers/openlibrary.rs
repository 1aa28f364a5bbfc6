use super::http::{ProviderHttp, expand_template, url_encode_component};
use super::Provider;
use crate::config::OPENLIBRARY;
use crate::error::Result;
use crate::normalize;
use crate::record::BookRecord;
use crate::{logi, logw};
use async_trait::async_trait;
use serde_json::Value;

/// OpenLibrary search, optionally followed by one work lookup per result to
/// pick up the description the search endpoint does not return.
pub struct OpenLibrary {
    http: ProviderHttp,
    search_template: String,
    work_template: Option<String>,
    fetch_details: bool,
}

impl OpenLibrary {
    pub fn new(
        http: ProviderHttp,
        search_template: String,
        work_template: Option<String>,
        fetch_details: bool,
    ) -> Self {
        Self {
            http,
            search_template,
            work_template,
            fetch_details,
        }
    }

    async fn work_description(&self, key: &str) -> Option<String> {
        let template = self.work_template.as_deref()?;
        let url = expand_template(template, &[("key", key)]);
        match self.http.get_json(OPENLIBRARY, &url).await {
            Ok(work) => normalize::text_field(work.get("description")),
            Err(err) => {
                logw(format!("OpenLibrary work lookup failed for {}: {}", key, err));
                None
            }
        }
    }
}

#[async_trait]
impl Provider for OpenLibrary {
    fn name(&self) -> &str {
        OPENLIBRARY
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<BookRecord>> {
        let max = max_results.to_string();
        let url = expand_template(
            &self.search_template,
            &[("query", &url_encode_component(query)), ("max", &max)],
        );
        logi(format!("OpenLibrary search: {}", url));

        let payload = self.http.get_json(OPENLIBRARY, &url).await?;
        let docs = docs(&payload);

        let mut out = Vec::with_capacity(docs.len().min(max_results));
        for doc in docs.iter().take(max_results) {
            let record = normalize::openlibrary_doc(doc, OPENLIBRARY);
            let key = doc.get("key").and_then(|v| v.as_str());

            let record = match key {
                Some(key) if self.fetch_details && !record.is_summarizable() => {
                    match self.work_description(key).await {
                        Some(description) => BookRecord {
                            description,
                            ..record
                        },
                        None => record,
                    }
                }
                _ => record,
            };
            out.push(record);
        }
        Ok(out)
    }
}

fn docs(payload: &Value) -> Vec<Value> {
    match payload.get("docs").and_then(|v| v.as_array()) {
        Some(docs) => docs.clone(),
        None => {
            logw("OpenLibrary response has no docs array; treating as empty");
            Vec::new()
        }
    }
}
