//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`. Shared wiring (config to pipeline) lives here.

use luna_agent::{AgentConfig, ReactAgent};
use luna_config::Config;
use luna_conversation::{AudioCache, Pipeline, SpeechSynthesizer};
use luna_core::PatternResponder;
use luna_providers::{ElevenLabsConfig, ElevenLabsSynthesizer, OpenAiCompatProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod chat;
mod cleanup;
mod init;
mod version;
mod voice_test;

pub use chat::{ChatInput, ChatStrategy};
pub use cleanup::{CleanupInput, CleanupStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;
pub use voice_test::VoiceTestStrategy;

/// Core trait defining the contract for all command strategies.
///
/// # Design Principles
/// - **Static dispatch**: All calls are monomorphized at compile time
/// - **Type safety**: Each strategy defines its own input type via associated type
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// The audio cache described by `config.audio`.
fn audio_cache(config: &Config) -> AudioCache {
    AudioCache::new(
        config.audio.resolved_dir(),
        Duration::from_secs(config.audio.max_age_minutes.saturating_mul(60)),
    )
}

/// Speech synthesizer for `config.voice`, or text-only mode.
fn build_speech(config: &Config, voice_enabled: bool) -> anyhow::Result<SpeechSynthesizer> {
    let Some(api_key) = config.voice.api_key().filter(|_| voice_enabled) else {
        info!("Voice disabled, replies will be text only");
        return Ok(SpeechSynthesizer::disabled());
    };

    let timeout = Duration::from_secs(config.voice.timeout_secs);
    let backend = ElevenLabsSynthesizer::new(ElevenLabsConfig {
        api_key: api_key.to_string(),
        voice_id: config.voice.voice_id.clone(),
        model_id: config.voice.model_id.clone(),
        output_format: config.voice.output_format.clone(),
        base_url: config.voice.base_url.clone(),
        timeout,
    })?;

    let speech = SpeechSynthesizer::new(Arc::new(backend), timeout);
    Ok(if config.audio.persist {
        speech.with_cache(audio_cache(config))
    } else {
        speech
    })
}

/// Rule table, optional agent and speech, wired from config.
fn build_pipeline(config: &Config, voice_enabled: bool) -> anyhow::Result<Pipeline> {
    let responder = Arc::new(PatternResponder::luna()?);
    let speech = build_speech(config, voice_enabled)?;
    let pipeline = Pipeline::new(responder, speech)
        .with_agent_timeout(Duration::from_secs(config.llm.timeout_secs));

    let Some(api_key) = config.llm.api_key() else {
        warn!("LLM API key missing, Luna will only use her built-in replies");
        return Ok(pipeline);
    };

    let provider = OpenAiCompatProvider::new(
        api_key.to_string(),
        Duration::from_secs(config.llm.timeout_secs),
    )?
        .with_base_url(config.llm.base_url.clone())
        .with_model(config.llm.model.clone())
        .with_temperature(config.llm.temperature);

    let agent = ReactAgent::new(
        Arc::new(provider),
        AgentConfig {
            model: config.llm.model.clone(),
            max_iterations: config.llm.max_iterations,
        },
    );

    Ok(pipeline.with_agent(Arc::new(agent)))
}
