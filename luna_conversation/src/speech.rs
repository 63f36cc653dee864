//! Best-effort voicing of replies.
//!
//! `SpeechSynthesizer` wraps an optional `SpeechBackend` with the failure
//! policy every turn relies on: text is sanitized first, backend calls are
//! bounded by a timeout, and any failure becomes a classified warning rather
//! than an error.

use std::sync::Arc;
use std::time::Duration;

use luna_core::util::{preview, sanitize_for_speech};
use luna_core::{SpeechBackend, SpeechError, SpeechFailureKind, TurnAudio, VoiceCheck};
use tracing::{debug, info, warn};

use crate::audio_cache::AudioCache;

/// Audio for one reply, or the reason there is none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesis {
    pub audio: Option<TurnAudio>,
    pub warning: Option<SpeechFailureKind>,
}

/// Result of the start-up voice probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceStatus {
    /// No voice credential: replies are text only.
    TextOnly,
    /// The configured voice exists.
    Ready(String),
    /// A credential is present but the voice could not be confirmed.
    Shy(String),
}

#[derive(Clone)]
pub struct SpeechSynthesizer {
    backend: Option<Arc<dyn SpeechBackend>>,
    timeout: Duration,
    cache: Option<AudioCache>,
}

impl SpeechSynthesizer {
    pub fn new(backend: Arc<dyn SpeechBackend>, timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            timeout,
            cache: None,
        }
    }

    /// Text-only mode. `synthesize` never produces audio.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            backend: None,
            timeout: Duration::from_secs(30),
            cache: None,
        }
    }

    /// Persist audio into `cache` and attach file references instead of bytes.
    #[must_use]
    pub fn with_cache(mut self, cache: AudioCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    #[must_use]
    pub const fn cache(&self) -> Option<&AudioCache> {
        self.cache.as_ref()
    }

    pub async fn synthesize(&self, text: &str) -> Synthesis {
        let Some(backend) = &self.backend else {
            return Synthesis::default();
        };

        let clean = sanitize_for_speech(text);
        if clean.is_empty() {
            debug!("Nothing speakable in \"{}\"", preview(text, 40));
            return Synthesis::default();
        }

        let result = match tokio::time::timeout(self.timeout, backend.synthesize(&clean)).await {
            Ok(result) => result,
            Err(_) => Err(SpeechError::Timeout(self.timeout.as_secs())),
        };

        match result {
            Ok(bytes) => {
                info!("Synthesized {} bytes of audio", bytes.len());
                Synthesis {
                    audio: Some(self.attach(bytes, backend.audio_extension()).await),
                    warning: None,
                }
            }
            Err(e) => {
                let kind = e.kind();
                warn!("Speech synthesis failed ({kind}): {e}");
                Synthesis {
                    audio: None,
                    warning: Some(kind),
                }
            }
        }
    }

    async fn attach(&self, bytes: Vec<u8>, extension: &str) -> TurnAudio {
        let Some(cache) = &self.cache else {
            return TurnAudio::Bytes(bytes);
        };

        match cache.store(&bytes, extension).await {
            Ok(path) => TurnAudio::File(path),
            Err(e) => {
                warn!("Could not cache audio, keeping it in memory: {e}");
                TurnAudio::Bytes(bytes)
            }
        }
    }

    /// Ask the backend whether the configured voice exists.
    pub async fn check_voice(&self) -> VoiceStatus {
        let Some(backend) = &self.backend else {
            return VoiceStatus::TextOnly;
        };

        let result = match tokio::time::timeout(self.timeout, backend.check_voice()).await {
            Ok(result) => result,
            Err(_) => Err(SpeechError::Timeout(self.timeout.as_secs())),
        };

        match result {
            Ok(check @ VoiceCheck::Found(_)) => {
                info!("{}", check.describe());
                VoiceStatus::Ready(check.describe())
            }
            Ok(check) => {
                warn!("{}", check.describe());
                VoiceStatus::Shy(check.describe())
            }
            Err(e) => {
                warn!("Voice check failed ({}): {e}", e.kind());
                VoiceStatus::Shy(format!("voice check failed: {}", preview(&e.to_string(), 80)))
            }
        }
    }
}
