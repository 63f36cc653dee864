//! Text-to-speech backend contract and its failure taxonomy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// User-facing buckets for synthesis failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechFailureKind {
    Quota,
    Auth,
    NotFound,
    Generic,
}

impl SpeechFailureKind {
    /// Short warning shown next to the reply.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::Quota => "🔊 Luna's voice quota is used up! She'll be quiet for now~ 🤫",
            Self::Auth => {
                "🔐 Luna's voice key isn't working! Please check your ElevenLabs API key."
            }
            Self::NotFound => "🎭 Luna's voice ID might be wrong. Please check VOICE_ID.",
            Self::Generic => "🔊 Luna's voice box is having a tiny problem! She'll try again later~ 💖",
        }
    }
}

impl fmt::Display for SpeechFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quota => "quota",
            Self::Auth => "auth",
            Self::NotFound => "not-found",
            Self::Generic => "generic",
        })
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Voice quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Voice credentials rejected: {0}")]
    Unauthorized(String),

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    #[error("Speech backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Speech transport error: {0}")]
    Transport(String),

    #[error("Speech synthesis timed out after {0}s")]
    Timeout(u64),

    #[error("Speech backend returned no audio")]
    EmptyAudio,
}

impl SpeechError {
    #[must_use]
    pub const fn kind(&self) -> SpeechFailureKind {
        match self {
            Self::QuotaExceeded(_) => SpeechFailureKind::Quota,
            Self::Unauthorized(_) => SpeechFailureKind::Auth,
            Self::VoiceNotFound(_) => SpeechFailureKind::NotFound,
            Self::Status { .. } | Self::Transport(_) | Self::Timeout(_) | Self::EmptyAudio => {
                SpeechFailureKind::Generic
            }
        }
    }

    /// Map a failed HTTP response into the taxonomy.
    ///
    /// Vendor bodies are checked before status codes: quota exhaustion is
    /// reported with a 401 by some backends.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let lower = body.to_lowercase();
        let body = body.to_string();

        if lower.contains("quota_exceeded") || lower.contains("usage limit") {
            Self::QuotaExceeded(body)
        } else if lower.contains("invalid_api_key") || lower.contains("unauthorized") {
            Self::Unauthorized(body)
        } else if lower.contains("voice") && (lower.contains("not found") || lower.contains("not_found"))
        {
            Self::VoiceNotFound(body)
        } else if status == 401 || status == 403 {
            Self::Unauthorized(body)
        } else if status == 404 {
            Self::VoiceNotFound(body)
        } else {
            Self::Status { status, body }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub voice_id: String,
    pub name: String,
}

/// Outcome of probing the backend for the configured voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCheck {
    Found(VoiceInfo),
    Missing {
        voice_id: String,
        available: Vec<VoiceInfo>,
    },
}

impl VoiceCheck {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Found(voice) => format!("Found Luna's voice: {}", voice.name),
            Self::Missing {
                voice_id,
                available,
            } => {
                let short: String = voice_id.chars().take(8).collect();
                let listed = available
                    .iter()
                    .take(5)
                    .map(|v| {
                        let id: String = v.voice_id.chars().take(8).collect();
                        format!("{} ({id}...)", v.name)
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Voice ID {short}... not found. Available: {listed}")
            }
        }
    }
}

#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Render already-sanitized text into encoded audio.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;

    /// Look the configured voice up among the account's voices.
    async fn check_voice(&self) -> Result<VoiceCheck, SpeechError>;

    /// File extension of the encoded audio, e.g. `mp3`.
    fn audio_extension(&self) -> &str;
}
