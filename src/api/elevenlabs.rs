use super::{AudioHandle, SpeechSynthesizer};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::logi;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

pub struct ElevenLabsTts {
    client: Client,
    api_key: String,
    base: String,
    voice_ids: Vec<String>,
    model_id: String,
    out_dir: PathBuf,
}

impl ElevenLabsTts {
    pub fn new(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            api_key: cfg.elevenlabs_key.clone(),
            base: cfg.elevenlabs_base.trim_end_matches('/').to_string(),
            voice_ids: cfg.eleven_voice_ids.clone(),
            model_id: cfg.eleven_model_id.clone(),
            out_dir: cfg.voices_dir.clone(),
        }
    }

    /// A different voice per book keeps a batch of reels from sounding samey.
    fn pick_voice(&self) -> Option<&str> {
        self.voice_ids
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTts {
    async fn synthesize(&self, text: &str, stem: &str) -> Result<AudioHandle> {
        let voice = self
            .pick_voice()
            .ok_or_else(|| PipelineError::Synthesis("no ElevenLabs voice configured".into()))?
            .to_string();
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format=mp3_44100_128",
            self.base, voice
        );

        let body = serde_json::json!({
            "text": text,
            "model_id": self.model_id,
        });

        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .timeout(Duration::from_secs(300))
            .send()
            .await
            .map_err(|e| PipelineError::Synthesis(format!("ElevenLabs request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(PipelineError::Synthesis(format!(
                "ElevenLabs TTS failed HTTP {}",
                resp.status().as_u16()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PipelineError::Synthesis(format!("ElevenLabs response read failed: {e}")))?;
        if bytes.is_empty() {
            return Err(PipelineError::Synthesis("ElevenLabs returned empty audio".into()));
        }

        fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|e| PipelineError::Synthesis(format!("create {}: {e}", self.out_dir.display())))?;
        let path = self.out_dir.join(format!("{stem}.mp3"));
        fs::write(&path, &bytes)
            .await
            .map_err(|e| PipelineError::Synthesis(format!("write {}: {e}", path.display())))?;

        logi(format!("Saved voice-over {} (voice={})", path.display(), voice));
        Ok(AudioHandle { path })
    }
}
