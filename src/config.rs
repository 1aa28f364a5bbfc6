use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub const OPENLIBRARY: &str = "OpenLibrary";
pub const OPENLIBRARY_WORK: &str = "OpenLibraryWork";
pub const GOOGLE_BOOKS: &str = "GoogleBooks";
pub const PROJECT_GUTENBERG: &str = "ProjectGutenberg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerKind {
    #[default]
    OpenAi,
    HuggingFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Ffmpeg,
    Creatomate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider name to URL template. Templates use `{query}`, `{max}` and,
    /// for the work endpoint, `{key}`.
    pub provider_endpoints: BTreeMap<String, String>,
    /// Query order; earlier providers win title ties.
    pub providers: Vec<String>,
    pub timeout_secs: u64,
    pub max_results_per_provider: usize,
    pub retry: RetryPolicy,
    pub fetch_details: bool,
    pub gutenberg_text_chars: usize,

    pub output_path: PathBuf,
    pub summaries_path: PathBuf,
    pub voices_dir: PathBuf,
    pub videos_dir: PathBuf,

    pub google_books_key: String,

    pub summarizer: SummarizerKind,
    pub summary_input_chars: usize,
    #[serde(rename = "open_api_key")]
    pub openai_key: String,
    pub openai_model: String,
    pub openai_base: String,
    pub hf_api_token: String,
    pub hf_model: String,
    pub hf_base: String,

    #[serde(rename = "elevenlabs_api_key")]
    pub elevenlabs_key: String,
    pub eleven_voice_ids: Vec<String>,
    pub eleven_model_id: String,
    pub elevenlabs_base: String,

    pub renderer: RendererKind,
    pub creatomate_api_key: String,
    pub creatomate_base: String,
    pub creatomate_poll_secs: u64,
    pub creatomate_max_wait_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_endpoints: default_endpoints(),
            providers: vec![
                OPENLIBRARY.to_string(),
                GOOGLE_BOOKS.to_string(),
                PROJECT_GUTENBERG.to_string(),
            ],
            timeout_secs: 15,
            max_results_per_provider: 10,
            retry: RetryPolicy::default(),
            fetch_details: true,
            gutenberg_text_chars: 3000,
            output_path: PathBuf::from("data/books.json"),
            summaries_path: PathBuf::from("data/summaries.json"),
            voices_dir: PathBuf::from("voices"),
            videos_dir: PathBuf::from("videos"),
            google_books_key: String::new(),
            summarizer: SummarizerKind::default(),
            summary_input_chars: 3000,
            openai_key: String::new(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_base: "https://api.openai.com".to_string(),
            hf_api_token: String::new(),
            hf_model: "facebook/bart-large-cnn".to_string(),
            hf_base: "https://api-inference.huggingface.co".to_string(),
            elevenlabs_key: String::new(),
            eleven_voice_ids: vec!["JBFqnCBsd6RMkjVDRZzb".to_string()],
            eleven_model_id: "eleven_multilingual_v2".to_string(),
            elevenlabs_base: "https://api.elevenlabs.io".to_string(),
            renderer: RendererKind::default(),
            creatomate_api_key: String::new(),
            creatomate_base: "https://api.creatomate.com".to_string(),
            creatomate_poll_secs: 15,
            creatomate_max_wait_secs: 15 * 60,
        }
    }
}

fn default_endpoints() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            OPENLIBRARY.to_string(),
            "https://openlibrary.org/search.json?q={query}&limit={max}".to_string(),
        ),
        (
            OPENLIBRARY_WORK.to_string(),
            "https://openlibrary.org{key}.json".to_string(),
        ),
        (
            GOOGLE_BOOKS.to_string(),
            "https://www.googleapis.com/books/v1/volumes?q={query}&maxResults={max}".to_string(),
        ),
        (
            PROJECT_GUTENBERG.to_string(),
            "https://gutendex.com/books/?search={query}".to_string(),
        ),
    ])
}

impl Config {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if fs::metadata(&path).await.is_ok() {
            return Self::load(path).await;
        }
        let mut config = Config::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Fills empty API keys from the environment.
    pub fn apply_env(&mut self) {
        fill_from_env(&mut self.openai_key, "OPENAI_API_KEY");
        fill_from_env(&mut self.hf_api_token, "HF_API_TOKEN");
        fill_from_env(&mut self.elevenlabs_key, "ELEVENLABS_API_KEY");
        fill_from_env(&mut self.creatomate_api_key, "CREATOMATE_API_KEY");
        fill_from_env(&mut self.google_books_key, "GOOGLE_BOOKS_API_KEY");
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_results_per_provider == 0 {
            anyhow::bail!("config: max_results_per_provider must be > 0");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("config: timeout_secs must be > 0");
        }
        for name in &self.providers {
            if !self.provider_endpoints.contains_key(name) {
                anyhow::bail!("config: provider {} has no entry in provider_endpoints", name);
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn endpoint(&self, name: &str) -> Option<&str> {
        self.provider_endpoints.get(name).map(String::as_str)
    }
}

fn fill_from_env(slot: &mut String, var: &str) {
    if slot.is_empty() {
        if let Ok(value) = std::env::var(var) {
            *slot = value;
        }
    }
}
