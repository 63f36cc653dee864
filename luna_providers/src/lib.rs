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

//! Remote backends: an OpenAI-compatible chat completion provider for the
//! agent and the ElevenLabs text-to-speech client.

mod elevenlabs;
mod openai;
pub mod retry;

pub use elevenlabs::{ElevenLabsConfig, ElevenLabsSynthesizer};
pub use openai::OpenAiCompatProvider;
pub use retry::{RetryPolicy, retry_with_backoff};
