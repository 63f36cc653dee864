use luna_config::Config;
use luna_conversation::AudioCache;
use std::time::Duration;

use super::audio_cache;

/// Input parameters for the Cleanup command strategy.
#[derive(Debug, Clone, Copy)]
pub struct CleanupInput {
    /// Overrides `audio.max_age_minutes` from the config.
    pub max_age_minutes: Option<u64>,
}

/// Strategy for evicting old cached audio files.
#[derive(Debug, Clone, Copy)]
pub struct CleanupStrategy;

impl super::CommandStrategy for CleanupStrategy {
    type Input = CleanupInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let mut cache = audio_cache(&config);
        if let Some(minutes) = input.max_age_minutes {
            cache = AudioCache::new(
                cache.dir().to_path_buf(),
                Duration::from_secs(minutes.saturating_mul(60)),
            );
        }

        let removed = cache.evict_expired()?;
        println!(
            "🧹 Removed {removed} audio file(s) older than {} minutes from {}",
            cache.max_age().as_secs() / 60,
            cache.dir().display()
        );
        Ok(())
    }
}
