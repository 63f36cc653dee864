use luna_config::Config;
use luna_conversation::VoiceStatus;
use luna_core::TurnAudio;

use super::build_speech;

const TEST_SENTENCE: &str = "Kyaa~! Hello Master! This is Luna testing her voice! ✨";

/// Strategy for checking the voice backend end to end.
///
/// Probes the configured voice id, then synthesizes a short test sentence.
#[derive(Debug, Clone, Copy)]
pub struct VoiceTestStrategy;

impl super::CommandStrategy for VoiceTestStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let speech = build_speech(&config, true)?;

        println!("🎤 Voice Status");
        match speech.check_voice().await {
            VoiceStatus::TextOnly => {
                println!("❌ Voice Disabled");
                println!("   ElevenLabs API key missing (set ELEVEN_API_KEY or voice.api_key)");
                return Ok(());
            }
            VoiceStatus::Ready(message) => {
                println!("✅ Voice Active");
                println!("   {message}");
            }
            VoiceStatus::Shy(message) => {
                println!("⚠️ Voice Issues");
                println!("   {message}");
            }
        }

        println!();
        println!("🔊 Synthesizing: {TEST_SENTENCE}");
        let synthesis = speech.synthesize(TEST_SENTENCE).await;
        match (synthesis.audio, synthesis.warning) {
            (Some(TurnAudio::File(path)), _) => println!("✅ Audio saved to {}", path.display()),
            (Some(TurnAudio::Bytes(bytes)), _) => {
                println!("✅ Received {} bytes of audio", bytes.len());
            }
            (None, Some(kind)) => println!("{}", kind.user_message()),
            (None, None) => println!("⚠️ Nothing to synthesize"),
        }

        Ok(())
    }
}
