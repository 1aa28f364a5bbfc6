use super::Summarizer;
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::{logi, logw};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAiSummarizer {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl OpenAiSummarizer {
    pub fn new(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            api_key: cfg.openai_key.clone(),
            model: cfg.openai_model.clone(),
            url: format!("{}/v1/responses", cfg.openai_base.trim_end_matches('/')),
        }
    }
}

fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following book description as a voice-over for a 30-45 second Instagram Reel.\n\
         - 3 to 5 short sentences, under 90 words.\n\
         - Plain text only, no hashtags, no emojis, no lists.\n\n\
         TEXT:\n{}\n",
        text
    )
}

pub(crate) fn openai_extract_output_text(resp_json: &str) -> Option<String> {
    let root: serde_json::Value = serde_json::from_str(resp_json).ok()?;

    if let Some(err) = root.get("error").filter(|e| !e.is_null()) {
        if let Some(msg) = err.get("message").and_then(|v| v.as_str()) {
            logw(format!("OpenAI error message: {}", msg));
        }
        if let Some(code) = err.get("code").and_then(|v| v.as_str()) {
            logw(format!("OpenAI error code: {}", code));
        }
        return None;
    }

    let output = root.get("output")?.as_array()?;
    for item in output {
        let Some(content) = item.get("content").and_then(|v| v.as_array()) else {
            continue;
        };
        for entry in content {
            let typ = entry.get("type").and_then(|v| v.as_str());
            let text = entry.get("text").and_then(|v| v.as_str());
            if let (Some("output_text"), Some(text)) = (typ, text) {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
    }

    None
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "input": [
                {"role": "system", "content": "You write short, punchy book summaries for social video."},
                {"role": "user", "content": summary_prompt(text)},
            ],
        });

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| PipelineError::Summarization(format!("OpenAI request failed: {e}")))?;

        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            let snippet = raw.chars().take(800).collect::<String>();
            return Err(PipelineError::Summarization(format!(
                "OpenAI HTTP {}: {}",
                status.as_u16(),
                snippet
            )));
        }

        let summary = openai_extract_output_text(&raw)
            .ok_or_else(|| PipelineError::Summarization("OpenAI response had no output_text".into()))?;
        logi(format!("OpenAI summary received ({} chars)", summary.len()));
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_output_text() {
        let raw = r#"{"output":[{"type":"reasoning","content":[]},{"type":"message","content":[{"type":"output_text","text":" Habits compound. "}]}]}"#;
        assert_eq!(openai_extract_output_text(raw).as_deref(), Some("Habits compound."));
    }

    #[test]
    fn error_body_yields_none() {
        let raw = r#"{"error":{"message":"bad key","code":"invalid_api_key"}}"#;
        assert_eq!(openai_extract_output_text(raw), None);
    }

    #[test]
    fn prompt_embeds_text() {
        assert!(summary_prompt("a book about focus").ends_with("TEXT:\na book about focus\n"));
    }
}
