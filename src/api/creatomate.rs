use super::{AudioHandle, VideoHandle, VideoRenderer};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::ffmpeg;
use crate::{logi, logok, logw};
use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

pub const REEL_WIDTH: u32 = 1080;
pub const REEL_HEIGHT: u32 = 1920;
pub const MAX_REEL_SECS: f64 = 45.0;

/// Cloud renderer: queue a render, poll until it settles, download the MP4,
/// then lay the local voice-over onto it.
pub struct CreatomateRenderer {
    client: Client,
    api_key: String,
    renders_url: String,
    poll_interval: Duration,
    max_wait: Duration,
    out_dir: PathBuf,
}

impl CreatomateRenderer {
    pub fn new(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            api_key: cfg.creatomate_api_key.clone(),
            renders_url: format!("{}/v1/renders", cfg.creatomate_base.trim_end_matches('/')),
            poll_interval: Duration::from_secs(cfg.creatomate_poll_secs),
            max_wait: Duration::from_secs(cfg.creatomate_max_wait_secs),
            out_dir: cfg.videos_dir.clone(),
        }
    }

    pub async fn start_render(&self, text: &str, duration: f64) -> Result<String> {
        let body = json!({
            "source": {
                "output_format": "mp4",
                "width": REEL_WIDTH,
                "height": REEL_HEIGHT,
                "duration": duration,
                "elements": [
                    {"type": "shape", "fill_color": "#101418", "width": "100%", "height": "100%"},
                    {
                        "type": "text",
                        "text": text,
                        "width": "86%",
                        "height": "80%",
                        "font_family": "Inter",
                        "font_size": "5.5 vmin",
                        "fill_color": "#ffffff",
                        "y_alignment": "50%",
                    }
                ]
            }
        });

        let resp = self
            .client
            .post(&self.renders_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| PipelineError::Render(format!("Creatomate request failed: {e}")))?;

        let status = resp.status();
        let raw = resp.text().await.unwrap_or_default();
        if status != StatusCode::OK && status != StatusCode::ACCEPTED {
            return Err(PipelineError::Render(format!(
                "Creatomate render start failed HTTP {}: {}",
                status.as_u16(),
                raw.chars().take(400).collect::<String>()
            )));
        }

        let data = first_render(&raw)?;
        let render_id = data.get("id").and_then(|v| v.as_str()).unwrap_or_default();
        if !is_render_id(render_id) {
            return Err(PipelineError::Render(format!(
                "received invalid render id: {render_id:?}"
            )));
        }

        logi(format!("Render queued, id={}", render_id));
        Ok(render_id.to_string())
    }

    /// Polls until the render finishes and returns its download URL.
    pub async fn poll_render(&self, render_id: &str) -> Result<String> {
        if !is_render_id(render_id) {
            return Err(PipelineError::Render(format!("invalid render id: {render_id}")));
        }

        let url = format!("{}/{}", self.renders_url, render_id);
        let mut waited = Duration::ZERO;
        loop {
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.api_key)
                .timeout(Duration::from_secs(30))
                .send()
                .await
                .map_err(|e| PipelineError::Render(format!("Creatomate poll failed: {e}")))?;

            let status = resp.status();
            let raw = resp.text().await.unwrap_or_default();
            if status != StatusCode::OK {
                return Err(PipelineError::Render(format!(
                    "Creatomate poll failed HTTP {}: {}",
                    status.as_u16(),
                    raw.chars().take(400).collect::<String>()
                )));
            }

            let data = first_render(&raw)?;
            match data.get("status").and_then(|v| v.as_str()) {
                Some("finished") => {
                    logok(format!("Render finished after {:?}", waited));
                    return data
                        .get("url")
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                        .ok_or_else(|| PipelineError::Render("finished render has no url".into()));
                }
                Some(s @ ("failed" | "cancelled")) => {
                    let reason = data
                        .get("error_message")
                        .and_then(|v| v.as_str())
                        .unwrap_or("no reason given");
                    return Err(PipelineError::Render(format!("render {s}: {reason}")));
                }
                _ => {}
            }

            if waited >= self.max_wait {
                return Err(PipelineError::Render(format!(
                    "render timeout: still pending after {:?}",
                    self.max_wait
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
            waited += self.poll_interval.max(Duration::from_millis(1));
        }
    }

    async fn download(&self, file_url: &str, out_path: &Path) -> Result<()> {
        logi(format!("Downloading: {}", file_url));
        let download_err = |e: reqwest::Error| PipelineError::Render(format!("download failed: {e}"));
        let bytes = self
            .client
            .get(file_url)
            .timeout(Duration::from_secs(300))
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(download_err)?
            .bytes()
            .await
            .map_err(download_err)?;

        fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|e| PipelineError::Render(format!("create {}: {e}", self.out_dir.display())))?;
        fs::write(out_path, &bytes)
            .await
            .map_err(|e| PipelineError::Render(format!("write {}: {e}", out_path.display())))?;
        logi(format!("Saved to {}", out_path.display()));
        Ok(())
    }
}

#[async_trait]
impl VideoRenderer for CreatomateRenderer {
    async fn render(&self, text: &str, audio: &AudioHandle, stem: &str) -> Result<VideoHandle> {
        let duration = match ffmpeg::ffprobe_duration_seconds(&audio.path).await {
            Ok(d) => d.min(MAX_REEL_SECS),
            Err(_) => MAX_REEL_SECS,
        };

        let render_id = self.start_render(text, duration).await?;
        let video_url = self.poll_render(&render_id).await?;

        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let silent = self.out_dir.join(format!("{stem}_{ts}_silent.mp4"));
        let out = self.out_dir.join(format!("{stem}_{ts}.mp4"));
        self.download(&video_url, &silent).await?;

        match ffmpeg::ffmpeg_mux_audio(&silent, &audio.path, &out).await {
            Ok(true) => {
                let _ = fs::remove_file(&silent).await;
            }
            Ok(false) | Err(_) => {
                logw("Audio mux failed; keeping the silent render");
                fs::rename(&silent, &out)
                    .await
                    .map_err(|e| PipelineError::Render(format!("rename {}: {e}", silent.display())))?;
            }
        }

        logok(format!("Reel ready: {}", out.display()));
        Ok(VideoHandle { path: out })
    }
}

/// Creatomate answers with either one render object or an array of them.
fn first_render(raw: &str) -> Result<Value> {
    let data: Value = serde_json::from_str(raw)
        .map_err(|e| PipelineError::Render(format!("Creatomate returned invalid JSON: {e}")))?;
    match data {
        Value::Array(mut items) if !items.is_empty() => Ok(items.swap_remove(0)),
        Value::Array(_) => Err(PipelineError::Render("Creatomate returned an empty list".into())),
        other => Ok(other),
    }
}

fn render_id_regex() -> anyhow::Result<&'static Regex> {
    static RENDER_ID_RE: OnceCell<Regex> = OnceCell::new();
    RENDER_ID_RE.get_or_try_init(|| {
        Regex::new(r"^[0-9a-fA-F-]{36}$").context("failed to compile render id regex")
    })
}

pub fn is_render_id(id: &str) -> bool {
    render_id_regex().map(|re| re.is_match(id)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_id_shape() {
        assert!(is_render_id("0b7c2f3e-8d7a-4a4f-9c1e-2b3d4e5f6a7b"));
        assert!(!is_render_id("not-a-uuid"));
        assert!(!is_render_id(""));
    }

    #[test]
    fn array_or_object_payload() {
        let arr = first_render(r#"[{"id":"a"},{"id":"b"}]"#).unwrap();
        assert_eq!(arr["id"], "a");
        let obj = first_render(r#"{"id":"c"}"#).unwrap();
        assert_eq!(obj["id"], "c");
        assert!(first_render("[]").is_err());
    }
}
