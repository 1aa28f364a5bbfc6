use super::http::{ProviderHttp, expand_template, url_encode_component};
use super::Provider;
use crate::config::PROJECT_GUTENBERG;
use crate::error::Result;
use crate::normalize;
use crate::record::BookRecord;
use crate::{logi, logw};
use async_trait::async_trait;

const START_MARKER: &str = "*** START OF";

/// Project Gutenberg through the Gutendex catalogue. Books without a summary
/// can fall back to the opening of their plain-text edition.
pub struct Gutendex {
    http: ProviderHttp,
    template: String,
    fetch_text: bool,
    text_chars: usize,
}

impl Gutendex {
    pub fn new(http: ProviderHttp, template: String, fetch_text: bool, text_chars: usize) -> Self {
        Self {
            http,
            template,
            fetch_text,
            text_chars,
        }
    }

    async fn opening_text(&self, url: &str) -> Option<String> {
        match self.http.get_text(PROJECT_GUTENBERG, url).await {
            Ok(body) => {
                let text = normalize::truncate_chars(strip_license_header(&body).trim(), self.text_chars);
                if text.is_empty() { None } else { Some(text) }
            }
            Err(err) => {
                logw(format!("Gutenberg text download failed: {}", err));
                None
            }
        }
    }
}

#[async_trait]
impl Provider for Gutendex {
    fn name(&self) -> &str {
        PROJECT_GUTENBERG
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<BookRecord>> {
        let max = max_results.to_string();
        let url = expand_template(
            &self.template,
            &[("query", &url_encode_component(query)), ("max", &max)],
        );
        logi(format!("Gutendex search: {}", url));

        let payload = self.http.get_json(PROJECT_GUTENBERG, &url).await?;
        let Some(results) = payload.get("results").and_then(|v| v.as_array()) else {
            logw("Gutendex response has no results array; treating as empty");
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for book in results.iter().take(max_results) {
            let record = normalize::gutendex_book(book, PROJECT_GUTENBERG);
            if record.is_summarizable() || !self.fetch_text {
                out.push(record);
                continue;
            }

            let text = match normalize::gutendex_text_url(book) {
                Some(text_url) => self.opening_text(&text_url).await,
                None => None,
            };
            out.push(match text {
                Some(description) => BookRecord {
                    description,
                    ..record
                },
                None => record,
            });
        }
        Ok(out)
    }
}

/// Drops the Project Gutenberg preamble up to and including the START line.
fn strip_license_header(body: &str) -> &str {
    let Some(pos) = body.find(START_MARKER) else {
        return body;
    };
    match body[pos..].find('\n') {
        Some(eol) => &body[pos + eol + 1..],
        None => "",
    }
}
