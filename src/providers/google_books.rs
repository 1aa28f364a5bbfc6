use super::http::{ProviderHttp, expand_template, url_encode_component};
use super::Provider;
use crate::config::GOOGLE_BOOKS;
use crate::error::Result;
use crate::record::BookRecord;
use crate::{logi, normalize};
use async_trait::async_trait;

/// The volumes endpoint rejects `maxResults` above this.
const MAX_PAGE_SIZE: usize = 40;

pub struct GoogleBooks {
    http: ProviderHttp,
    template: String,
    api_key: String,
}

impl GoogleBooks {
    pub fn new(http: ProviderHttp, template: String, api_key: String) -> Self {
        Self {
            http,
            template,
            api_key,
        }
    }
}

#[async_trait]
impl Provider for GoogleBooks {
    fn name(&self) -> &str {
        GOOGLE_BOOKS
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<BookRecord>> {
        let max = max_results.min(MAX_PAGE_SIZE).to_string();
        let url = expand_template(
            &self.template,
            &[("query", &url_encode_component(query)), ("max", &max)],
        );
        logi(format!("Google Books search: {}", url));
        let key_param = [("key", self.api_key.as_str())];
        let secret: &[(&str, &str)] = if self.api_key.is_empty() {
            &[]
        } else {
            &key_param
        };

        let payload = self
            .http
            .get_json_with_params(GOOGLE_BOOKS, &url, secret)
            .await?;
        // A query with no hits omits `items` entirely.
        let Some(items) = payload.get("items").and_then(|v| v.as_array()) else {
            return Ok(Vec::new());
        };

        Ok(items
            .iter()
            .take(max_results)
            .map(|item| normalize::google_volume(item, GOOGLE_BOOKS))
            .collect())
    }
}
