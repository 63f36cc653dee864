//! Conversation turns.
//!
//! A `Turn` is built once through `Turn::user` or `Turn::agent` and never
//! mutated afterwards. The constructors are the only way to attach an emotion,
//! which keeps user turns tag-free and agent turns tagged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::EmotionTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

/// Synthesized speech attached to an agent turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnAudio {
    /// Encoded audio kept in memory.
    Bytes(Vec<u8>),
    /// Encoded audio written to the scratch cache.
    File(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    speaker: Speaker,
    text: String,
    emotion: Option<EmotionTag>,
    audio: Option<TurnAudio>,
    created_at: DateTime<Utc>,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            emotion: None,
            audio: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn agent(text: impl Into<String>, emotion: EmotionTag, audio: Option<TurnAudio>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
            emotion: Some(emotion),
            audio,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn speaker(&self) -> Speaker {
        self.speaker
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn emotion(&self) -> Option<EmotionTag> {
        self.emotion
    }

    #[must_use]
    pub const fn audio(&self) -> Option<&TurnAudio> {
        self.audio.as_ref()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self.speaker, Speaker::User)
    }
}
