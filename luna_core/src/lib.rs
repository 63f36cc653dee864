#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod emotion;
pub mod responder;
pub mod speech;
pub mod turn;
pub mod util;

pub use emotion::{EmotionClassifier, EmotionTag};
pub use responder::{PatternResponder, ResponseRule, RuleError};
pub use speech::{SpeechBackend, SpeechError, SpeechFailureKind, VoiceCheck, VoiceInfo};
pub use turn::{Speaker, Turn, TurnAudio};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse>;
    fn get_default_model(&self) -> &str;
}

/// The fallback responder consulted when no pattern rule matches.
///
/// Implementations may reason, call tools or talk to a remote model; callers
/// only see text in and text out.
#[async_trait]
pub trait ToolAgent: Send + Sync {
    async fn invoke(&self, input: &str) -> anyhow::Result<String>;
}
