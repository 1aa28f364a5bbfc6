//! Stages after ingestion: summarize each book, voice the summary, render a
//! vertical video. One book failing never stops the batch.

use crate::api::{self, AudioHandle, SpeechSynthesizer, Summarizer, VideoHandle, VideoRenderer};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::normalize::truncate_chars;
use crate::persist::{load_books, load_json, save_json};
use crate::providers::ProviderHttp;
use crate::record::{BookRecord, SummaryRecord, UNTITLED};
use crate::{logi, logok, logw};
use anyhow::Context;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;

fn unsafe_chars_regex() -> anyhow::Result<&'static Regex> {
    static UNSAFE_RE: OnceCell<Regex> = OnceCell::new();
    UNSAFE_RE.get_or_try_init(|| {
        Regex::new(r#"[\\/*?:"<>|()']"#).context("failed to compile file-name regex")
    })
}

/// File-system friendly stem for a title: spaces become underscores and
/// characters that are illegal on common file systems are dropped.
pub fn safe_name(title: &str) -> String {
    let underscored = title.trim().replace(' ', "_");
    let cleaned = match unsafe_chars_regex() {
        Ok(re) => re.replace_all(&underscored, "").into_owned(),
        Err(_) => underscored
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect(),
    };
    if cleaned.is_empty() {
        UNTITLED.to_string()
    } else {
        cleaned
    }
}

/// One stem per summary, in order. Titles that collapse to the same
/// [`safe_name`] get `_2`, `_3`, ... so no two books share a file.
pub fn unique_stems(summaries: &[SummaryRecord]) -> Vec<String> {
    let mut taken = HashSet::new();
    summaries
        .iter()
        .map(|summary| {
            let base = safe_name(&summary.title);
            let mut stem = base.clone();
            let mut n = 2;
            while !taken.insert(stem.clone()) {
                stem = format!("{base}_{n}");
                n += 1;
            }
            stem
        })
        .collect()
}

pub async fn summarize_books(
    books: &[BookRecord],
    summarizer: &dyn Summarizer,
    input_chars: usize,
    limit: Option<usize>,
) -> Vec<SummaryRecord> {
    let mut out = Vec::new();
    let wanted = limit.unwrap_or(usize::MAX);
    for book in books {
        if out.len() >= wanted {
            break;
        }
        if !book.is_summarizable() {
            logi(format!("Skipping \"{}\" (no description)", book.title));
            continue;
        }

        let input = truncate_chars(&book.description, input_chars);
        match summarizer.summarize(&input).await {
            Ok(summary) => {
                logok(format!("Summarized \"{}\"", book.title));
                out.push(SummaryRecord::from_book(book, summary));
            }
            Err(err) => logw(format!("Summary failed for \"{}\": {}", book.title, err)),
        }
    }
    out
}

pub async fn voice_summaries(
    summaries: &[SummaryRecord],
    synthesizer: &dyn SpeechSynthesizer,
) -> Vec<(SummaryRecord, AudioHandle)> {
    let mut out = Vec::new();
    for (summary, stem) in summaries.iter().zip(unique_stems(summaries)) {
        if summary.summary.trim().is_empty() {
            continue;
        }
        match synthesizer.synthesize(&summary.narration_script(), &stem).await {
            Ok(audio) => out.push((summary.clone(), audio)),
            Err(err) => logw(format!("Couldn't voice \"{}\": {}", summary.title, err)),
        }
    }
    out
}

pub async fn render_reels(
    voiced: &[(SummaryRecord, AudioHandle)],
    renderer: &dyn VideoRenderer,
) -> Vec<VideoHandle> {
    let mut out = Vec::new();
    for (summary, audio) in voiced {
        // Reuse the voice-over's stem so audio and video stay paired.
        let stem = audio
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| safe_name(&summary.title));
        match renderer.render(&summary.narration_script(), audio, &stem).await {
            Ok(video) => out.push(video),
            Err(err) => logw(format!("Render failed for \"{}\": {}", summary.title, err)),
        }
    }
    out
}

fn client() -> Result<reqwest::Client> {
    ProviderHttp::build_client()
}

async fn load_summaries(cfg: &Config) -> Result<Vec<SummaryRecord>> {
    let summaries: Vec<SummaryRecord> = load_json(&cfg.summaries_path).await?;
    if summaries.is_empty() {
        logw(format!("{} is empty", cfg.summaries_path.display()));
    }
    Ok(summaries)
}

/// Reads `books.json`, writes `summaries.json`. Returns the number of summaries.
pub async fn run_summarize(cfg: &Config, limit: Option<usize>) -> Result<usize> {
    let books = load_books(&cfg.output_path).await?;
    if books.is_empty() {
        logw(format!("{} is empty; nothing to summarize", cfg.output_path.display()));
    }
    let summarizer = api::summarizer_from_config(cfg, client()?)?;
    let summaries = summarize_books(&books, summarizer.as_ref(), cfg.summary_input_chars, limit).await;
    save_json(&summaries, &cfg.summaries_path).await?;
    logok(format!(
        "Saved {} summaries to {}",
        summaries.len(),
        cfg.summaries_path.display()
    ));
    Ok(summaries.len())
}

pub async fn run_voice(cfg: &Config) -> Result<usize> {
    let summaries = load_summaries(cfg).await?;
    let synthesizer = api::synthesizer_from_config(cfg, client()?)?;
    let voiced = voice_summaries(&summaries, synthesizer.as_ref()).await;
    logok(format!("Voiced {} of {} summaries", voiced.len(), summaries.len()));
    Ok(voiced.len())
}

/// Renders every summary whose voice-over already exists in `voices_dir`.
pub async fn run_render(cfg: &Config) -> Result<usize> {
    let summaries = load_summaries(cfg).await?;
    let renderer = api::renderer_from_config(cfg, client()?)?;

    let stems = unique_stems(&summaries);
    let mut voiced = Vec::new();
    for (summary, stem) in summaries.into_iter().zip(stems) {
        let path = cfg.voices_dir.join(format!("{stem}.mp3"));
        if tokio::fs::metadata(&path).await.is_ok() {
            voiced.push((summary, AudioHandle { path }));
        } else {
            logw(format!("No voice-over for \"{}\" at {}", summary.title, path.display()));
        }
    }

    let videos = render_reels(&voiced, renderer.as_ref()).await;
    logok(format!("Rendered {} reels", videos.len()));
    Ok(videos.len())
}

/// Summarize, voice and render in one pass, reusing the books already on disk.
pub async fn run_reels(cfg: &Config, limit: Option<usize>) -> Result<Vec<VideoHandle>> {
    let books = load_books(&cfg.output_path).await?;
    let http = client()?;
    let summarizer = api::summarizer_from_config(cfg, http.clone())?;
    let synthesizer = api::synthesizer_from_config(cfg, http.clone())?;
    let renderer = api::renderer_from_config(cfg, http)?;

    let summaries = summarize_books(&books, summarizer.as_ref(), cfg.summary_input_chars, limit).await;
    save_json(&summaries, &cfg.summaries_path).await?;
    if summaries.is_empty() {
        return Err(PipelineError::Summarization(
            "no book could be summarized".into(),
        ));
    }

    let voiced = voice_summaries(&summaries, synthesizer.as_ref()).await;
    let videos = render_reels(&voiced, renderer.as_ref()).await;
    logok(format!("Produced {} reels from {} books", videos.len(), books.len()));
    Ok(videos)
}
