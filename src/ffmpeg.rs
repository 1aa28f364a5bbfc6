use crate::api::creatomate::{MAX_REEL_SECS, REEL_HEIGHT, REEL_WIDTH};
use crate::api::{AudioHandle, VideoHandle, VideoRenderer};
use crate::error::{PipelineError, Result as PipelineResult};
use crate::{logi, logok, logw};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

const CAPTION_WRAP: usize = 34;

async fn run_cmd(args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Ok(());
    }

    let mut cmd = Command::new(&args[0]);
    if args.len() > 1 {
        cmd.args(&args[1..]);
    }

    let status = cmd.status().await.context("Command execution failed")?;
    if !status.success() {
        return Err(anyhow::anyhow!("Command failed: {:?}", args));
    }

    Ok(())
}

pub async fn ffprobe_duration_seconds(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .context("ffprobe duration failed")?;

    if !output.status.success() {
        return Err(anyhow::anyhow!("ffprobe failed"));
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let duration = text.parse::<f64>().unwrap_or(-1.0);
    if duration <= 0.1 {
        return Err(anyhow::anyhow!("Invalid duration"));
    }
    Ok(duration)
}

/// Replaces the audio of `video_in` with `audio_in`, cut to the shorter track.
pub async fn ffmpeg_mux_audio(video_in: &Path, audio_in: &Path, video_out: &Path) -> Result<bool> {
    let args = vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        video_in.display().to_string(),
        "-i".to_string(),
        audio_in.display().to_string(),
        "-map".to_string(),
        "0:v".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-shortest".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        video_out.display().to_string(),
    ];
    run_cmd(&args).await?;
    Ok(video_out.exists())
}

/// Builds the ffmpeg argument list for a vertical reel: solid background,
/// optional caption read from `caption_file`, narration as the audio track.
fn reel_args(audio: &Path, caption_file: Option<&Path>, duration: f64, out_mp4: &Path) -> Vec<String> {
    let mut filter = String::from("[0:v]format=yuv420p");
    if let Some(caption) = caption_file {
        filter.push_str(&format!(
            ",drawtext=textfile='{}':fontcolor=white:fontsize=54:line_spacing=18:x=(w-text_w)/2:y=(h-text_h)/2",
            caption.display().to_string().replace('\'', "\\'")
        ));
    }
    filter.push_str("[v]");

    vec![
        "ffmpeg".to_string(),
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!("color=c=0x101418:s={}x{}:r=30", REEL_WIDTH, REEL_HEIGHT),
        "-i".to_string(),
        audio.display().to_string(),
        "-t".to_string(),
        format!("{:.3}", duration),
        "-filter_complex".to_string(),
        filter,
        "-map".to_string(),
        "[v]".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-crf".to_string(),
        "22".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        out_mp4.display().to_string(),
    ]
}

/// Greedy word wrap for on-screen captions.
pub fn wrap_caption(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Local renderer producing a 1080x1920 MP4 capped at the Reel length.
pub struct FfmpegRenderer {
    out_dir: PathBuf,
}

impl FfmpegRenderer {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    async fn render_inner(&self, text: &str, audio: &Path, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("Failed to create dir {}", self.out_dir.display()))?;

        let duration = ffprobe_duration_seconds(audio)
            .await
            .with_context(|| format!("Bad narration duration for {}", audio.display()))?
            .min(MAX_REEL_SECS);

        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let out = self.out_dir.join(format!("{stem}_{ts}.mp4"));
        let caption = self.out_dir.join(format!("{stem}_{ts}_caption.txt"));
        fs::write(&caption, wrap_caption(text, CAPTION_WRAP)).await?;

        logi(format!("Rendering reel ({:.2}s) -> {}", duration, out.display()));
        let captioned = run_cmd(&reel_args(audio, Some(&caption), duration, &out)).await;
        let _ = fs::remove_file(&caption).await;

        if let Err(err) = captioned {
            // drawtext needs an ffmpeg built with libfreetype.
            logw(format!("Captioned render failed ({}); retrying without caption", err));
            run_cmd(&reel_args(audio, None, duration, &out)).await?;
        }

        if !out.exists() {
            anyhow::bail!("ffmpeg produced no output at {}", out.display());
        }
        Ok(out)
    }
}

#[async_trait]
impl VideoRenderer for FfmpegRenderer {
    async fn render(&self, text: &str, audio: &AudioHandle, stem: &str) -> PipelineResult<VideoHandle> {
        let path = self
            .render_inner(text, &audio.path, stem)
            .await
            .map_err(|e| PipelineError::Render(format!("{e:#}")))?;
        logok(format!("Reel ready: {}", path.display()));
        Ok(VideoHandle { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let wrapped = wrap_caption("Small habits make a remarkable difference over time", 20);
        for line in wrapped.lines() {
            assert!(line.chars().count() <= 20, "line too long: {line}");
        }
        assert_eq!(wrapped.split_whitespace().count(), 8);
    }

    #[test]
    fn keeps_paragraph_breaks() {
        assert_eq!(wrap_caption("Title: X\n\nSummary", 40), "Title: X\n\nSummary");
    }

    #[test]
    fn reel_args_cap_duration_and_map_audio() {
        let args = reel_args(Path::new("v.mp3"), None, 45.0, Path::new("out.mp4"));
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "45.000");
        assert!(args.contains(&"1:a".to_string()));
        assert!(args.iter().any(|a| a == "color=c=0x101418:s=1080x1920:r=30"));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
        assert!(!args.iter().any(|a| a.contains("drawtext")));
    }

    #[test]
    fn reel_args_with_caption() {
        let args = reel_args(
            Path::new("v.mp3"),
            Some(Path::new("cap.txt")),
            10.0,
            Path::new("out.mp4"),
        );
        assert!(args.iter().any(|a| a.contains("drawtext=textfile='cap.txt'")));
    }
}
