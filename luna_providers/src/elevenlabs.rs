use async_trait::async_trait;
use luna_core::util::preview;
use luna_core::{SpeechBackend, SpeechError, VoiceCheck, VoiceInfo};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// ElevenLabs client configuration.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    /// Vendor output format, e.g. `mp3_44100_128`.
    pub output_format: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ElevenLabsConfig {
    pub const DEFAULT_VOICE_ID: &'static str = "piTKgcLEGmPE4e6mEKli";
    pub const DEFAULT_MODEL_ID: &'static str = "eleven_multilingual_v2";
    pub const DEFAULT_OUTPUT_FORMAT: &'static str = "mp3_44100_128";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.elevenlabs.io";

    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            voice_id: Self::DEFAULT_VOICE_ID.to_string(),
            model_id: Self::DEFAULT_MODEL_ID.to_string(),
            output_format: Self::DEFAULT_OUTPUT_FORMAT.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceInfo>,
}

pub struct ElevenLabsSynthesizer {
    client: Client,
    config: ElevenLabsConfig,
    extension: String,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: ElevenLabsConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let extension = config
            .output_format
            .split('_')
            .next()
            .filter(|ext| !ext.is_empty())
            .unwrap_or("mp3")
            .to_string();

        info!(
            "Creating ElevenLabs synthesizer: voice={}, model={}",
            config.voice_id, config.model_id
        );

        Ok(Self {
            client,
            config,
            extension,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn transport_error(&self, error: &reqwest::Error) -> SpeechError {
        if error.is_timeout() {
            SpeechError::Timeout(self.config.timeout.as_secs())
        } else {
            SpeechError::Transport(error.to_string())
        }
    }

    async fn read_failure(response: reqwest::Response) -> SpeechError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        SpeechError::from_response(status, &body)
    }
}

#[async_trait]
impl SpeechBackend for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        info!("Synthesizing speech for: \"{}\"", preview(text, 50));

        let url = self.url(&format!(
            "/v1/text-to-speech/{}?output_format={}",
            self.config.voice_id, self.config.output_format
        ));

        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.config.api_key)
            .json(&json!({
                "text": text,
                "model_id": self.config.model_id,
            }))
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !response.status().is_success() {
            return Err(Self::read_failure(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if bytes.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        debug!("Received {} bytes of audio", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn check_voice(&self) -> Result<VoiceCheck, SpeechError> {
        let response = self
            .client
            .get(self.url("/v1/voices"))
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !response.status().is_success() {
            return Err(Self::read_failure(response).await);
        }

        let voices: VoicesResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))?;

        info!("Voice account lists {} voices", voices.voices.len());

        let wanted = &self.config.voice_id;
        let found = voices
            .voices
            .iter()
            .find(|v| &v.voice_id == wanted)
            .cloned();

        Ok(found.map_or_else(
            || VoiceCheck::Missing {
                voice_id: wanted.clone(),
                available: voices.voices,
            },
            VoiceCheck::Found,
        ))
    }

    fn audio_extension(&self) -> &str {
        &self.extension
    }
}
