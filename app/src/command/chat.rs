//! Conversation command: one message, or an interactive session.

use luna_config::Config;
use luna_conversation::{ConversationController, ConversationError, TurnOutcome};
use luna_core::{EmotionTag, TurnAudio};
use luna_core::responder::EXIT_FAREWELLS;
use rand::seq::SliceRandom;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::{audio_cache, build_pipeline};

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye", "goodbye"];

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Skip speech synthesis even when a voice key is configured
    pub no_voice: bool,
    /// Seed for reply and emotion picks
    pub seed: Option<u64>,
}

/// Strategy for executing the Chat command.
///
/// - Evicts expired cached audio
/// - Greets according to the voice status
/// - Answers a single message, or loops until an exit word or EOF
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        if config.audio.persist {
            if let Err(e) = audio_cache(&config).evict_expired() {
                warn!("Audio cache cleanup failed: {e}");
            }
        }

        let pipeline = Arc::new(build_pipeline(&config, !input.no_voice)?);
        let controller = match input.seed {
            Some(seed) => ConversationController::with_seed(pipeline, seed),
            None => ConversationController::new(pipeline),
        };

        if let Some(msg) = input.message {
            let outcome = controller.process(&msg).await?;
            print_outcome(&outcome);
            return Ok(());
        }

        let greeting = controller.greet().await?;
        print_outcome(&greeting);
        run_interactive(&controller).await?;

        info!(
            "Conversation ended: {} total turns",
            controller.history().await.len()
        );
        Ok(())
    }
}

fn is_exit_word(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_WORDS.contains(&lower.as_str())
}

fn farewell() -> &'static str {
    EXIT_FAREWELLS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Bye bye! 🌸")
}

fn error_reply(error: &ConversationError) -> String {
    format!("Eeeek! Luna encountered a tiny problem! {error} But don't worry, Luna is resilient! Let's try again! 💖")
}

async fn run_interactive(controller: &ConversationController) -> anyhow::Result<()> {
    println!("Type 'exit', 'quit', 'bye' or 'goodbye' to end the session.\n");

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        line.clear();
        let bytes_read = tokio::select! {
            read = reader.read_line(&mut line) => read?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted by Ctrl+C");
                println!("\n\nLuna: {}\n", farewell());
                break;
            }
        };
        if bytes_read == 0 {
            println!();
            break;
        }
        let input = line.trim();

        if is_exit_word(input) {
            println!("\nLuna: {}\n", farewell());
            break;
        }

        if input.is_empty() {
            continue;
        }

        match controller.process(input).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => {
                warn!("Turn rejected: {e}");
                println!("\nLuna: {}\n", error_reply(&e));
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &TurnOutcome) {
    let turn = &outcome.turn;
    let emotion = turn.emotion().unwrap_or(EmotionTag::Speaking);

    println!(
        "\nLuna [{emotion} · {}]: {}",
        emotion.avatar_image(),
        turn.text()
    );

    if let Some(TurnAudio::File(path)) = turn.audio() {
        println!("   🔊 {}", path.display());
    }
    for notice in &outcome.notices {
        println!("   {notice}");
    }
    println!();
}
