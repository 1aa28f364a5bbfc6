use super::Summarizer;
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::logi;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MIN_LENGTH: usize = 10;

/// Hosted inference for a seq2seq summarization model (BART by default).
pub struct HuggingFaceSummarizer {
    client: Client,
    token: String,
    url: String,
}

impl HuggingFaceSummarizer {
    pub fn new(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            token: cfg.hf_api_token.clone(),
            url: format!("{}/models/{}", cfg.hf_base.trim_end_matches('/'), cfg.hf_model),
        }
    }
}

/// Short inputs get short summaries: 1.5x the word count, clamped to 20..=100.
pub fn adaptive_max_length(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words * 3 / 2).clamp(20, 100)
}

fn extract_summary(body: &Value) -> Option<String> {
    let first = match body {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let text = first.get("summary_text")?.as_str()?.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "max_length": adaptive_max_length(text),
                "min_length": MIN_LENGTH,
                "do_sample": false,
                "truncation": "only_first",
            },
        });

        let mut req = self.client.post(&self.url).json(&body).timeout(REQUEST_TIMEOUT);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| PipelineError::Summarization(format!("HuggingFace request failed: {e}")))?;

        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            let snippet = raw.chars().take(400).collect::<String>();
            return Err(PipelineError::Summarization(format!(
                "HuggingFace HTTP {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let parsed: Value = serde_json::from_str(&raw)
            .map_err(|e| PipelineError::Summarization(format!("HuggingFace returned invalid JSON: {e}")))?;
        let summary = extract_summary(&parsed)
            .ok_or_else(|| PipelineError::Summarization("HuggingFace response had no summary_text".into()))?;
        logi(format!("HuggingFace summary received ({} chars)", summary.len()));
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_length_scales_and_clamps() {
        assert_eq!(adaptive_max_length("one two three"), 20);
        assert_eq!(adaptive_max_length(&"w ".repeat(40)), 60);
        assert_eq!(adaptive_max_length(&"w ".repeat(500)), 100);
    }

    #[test]
    fn summary_from_list_or_object() {
        assert_eq!(
            extract_summary(&json!([{"summary_text": "Short."}])).as_deref(),
            Some("Short.")
        );
        assert_eq!(
            extract_summary(&json!({"summary_text": "Also."})).as_deref(),
            Some("Also.")
        );
        assert_eq!(extract_summary(&json!({"error": "loading"})), None);
    }
}
