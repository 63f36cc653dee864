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
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

//! Turn-by-turn conversations with Luna.
//!
//! Each session owns its history and random generator behind one
//! `ConversationController`. Sessions share a read-only `Pipeline`: the rule
//! table, the optional agent fallback and the speech synthesizer.
//!
//! # Turn cycle
//! - The user turn is appended and the controller enters `AwaitingResponse`.
//! - A pattern rule answers, or the agent does, or a fixed apology does.
//! - The reply is tagged with an emotion and voiced on a best-effort basis.
//! - The agent turn is appended and the controller is `Idle` again.

mod audio_cache;
mod controller;
mod registry;
mod session;
mod speech;

pub use audio_cache::AudioCache;
pub use controller::{
    AGENT_FAILURE_REPLY, ControllerState, ConversationController, ConversationError,
    NO_AGENT_REPLY, Notice, Pipeline, TurnOutcome,
};
pub use registry::SessionRegistry;
pub use session::ConversationSession;
pub use speech::{SpeechSynthesizer, Synthesis, VoiceStatus};
