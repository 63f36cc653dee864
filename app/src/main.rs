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

mod command;

use clap::{Parser, Subcommand};
use command::{
    ChatInput, ChatStrategy, CleanupInput, CleanupStrategy, CommandStrategy, InitStrategy,
    VersionStrategy, VoiceTestStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "luna")]
#[command(about = "Luna, a cheerful anime-girl chat companion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with Luna interactively
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Do not synthesize speech
        #[arg(long)]
        no_voice: bool,

        /// Seed for reply and emotion choices
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check the voice backend and synthesize a test sentence
    VoiceTest,
    /// Remove old cached audio files
    Cleanup {
        /// Maximum age in minutes (defaults to audio.max_age_minutes)
        #[arg(long)]
        max_age_minutes: Option<u64>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            no_voice,
            seed,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    message,
                    no_voice,
                    seed,
                })
                .await
        }
        Commands::VoiceTest => VoiceTestStrategy.execute(()).await,
        Commands::Cleanup { max_age_minutes } => {
            CleanupStrategy
                .execute(CleanupInput { max_age_minutes })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
