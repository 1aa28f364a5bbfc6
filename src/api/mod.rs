//! Vendor adapters for the stages after ingestion.

use crate::config::{Config, RendererKind, SummarizerKind};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub mod creatomate;
pub mod elevenlabs;
pub mod huggingface;
pub mod openai;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoHandle {
    pub path: PathBuf,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Writes a voice-over for `text`; `stem` names the output file.
    async fn synthesize(&self, text: &str, stem: &str) -> Result<AudioHandle>;
}

#[async_trait]
pub trait VideoRenderer: Send + Sync {
    async fn render(&self, text: &str, audio: &AudioHandle, stem: &str) -> Result<VideoHandle>;
}

pub fn summarizer_from_config(cfg: &Config, client: reqwest::Client) -> Result<Box<dyn Summarizer>> {
    match cfg.summarizer {
        SummarizerKind::OpenAi => {
            if cfg.openai_key.is_empty() {
                return Err(PipelineError::Config(
                    "open_api_key missing (or set OPENAI_API_KEY)".into(),
                ));
            }
            Ok(Box::new(openai::OpenAiSummarizer::new(client, cfg)))
        }
        SummarizerKind::HuggingFace => {
            Ok(Box::new(huggingface::HuggingFaceSummarizer::new(client, cfg)))
        }
    }
}

pub fn synthesizer_from_config(
    cfg: &Config,
    client: reqwest::Client,
) -> Result<Box<dyn SpeechSynthesizer>> {
    if cfg.elevenlabs_key.is_empty() {
        return Err(PipelineError::Config(
            "elevenlabs_api_key missing (or set ELEVENLABS_API_KEY)".into(),
        ));
    }
    if cfg.eleven_voice_ids.is_empty() {
        return Err(PipelineError::Config("eleven_voice_ids is empty".into()));
    }
    Ok(Box::new(elevenlabs::ElevenLabsTts::new(client, cfg)))
}

pub fn renderer_from_config(cfg: &Config, client: reqwest::Client) -> Result<Box<dyn VideoRenderer>> {
    match cfg.renderer {
        RendererKind::Ffmpeg => Ok(Box::new(crate::ffmpeg::FfmpegRenderer::new(
            cfg.videos_dir.clone(),
        ))),
        RendererKind::Creatomate => {
            if cfg.creatomate_api_key.is_empty() {
                return Err(PipelineError::Config(
                    "creatomate_api_key missing (or set CREATOMATE_API_KEY)".into(),
                ));
            }
            Ok(Box::new(creatomate::CreatomateRenderer::new(client, cfg)))
        }
    }
}
