use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const APP_DIR: &str = "luna";
const CONFIG_FILE: &str = "config.json";

const CONFIG_TEMPLATE: &str = r#"{
  "llm": {
    "api_key": "your-llm-api-key-here",
    "base_url": "https://generativelanguage.googleapis.com/v1beta/openai",
    "model": "gemini-2.0-flash",
    "temperature": 0.7,
    "max_iterations": 5,
    "timeout_secs": 60
  },
  "voice": {
    "api_key": "your-elevenlabs-api-key-here",
    "voice_id": "piTKgcLEGmPE4e6mEKli",
    "model_id": "eleven_multilingual_v2",
    "output_format": "mp3_44100_128",
    "base_url": "https://api.elevenlabs.io",
    "timeout_secs": 30
  },
  "audio": {
    "persist": true,
    "max_age_minutes": 30
  }
}"#;

/// Keys still holding a template placeholder are treated as absent.
fn usable_key(key: &str) -> Option<&str> {
    let key = key.trim();
    if key.is_empty() || key.starts_with("your-") || key.starts_with("your_") {
        None
    } else {
        Some(key)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Model calls allowed per agent question.
    pub max_iterations: usize,
    /// Bound on one whole agent answer, tool calls included.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.7,
            max_iterations: 5,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        usable_key(&self.api_key)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct VoiceConfig {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            voice_id: "piTKgcLEGmPE4e6mEKli".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_44100_128".to_string(),
            base_url: "https://api.elevenlabs.io".to_string(),
            timeout_secs: 30,
        }
    }
}

impl VoiceConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        usable_key(&self.api_key)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AudioConfig {
    /// Write synthesized audio to `dir` instead of keeping it in memory.
    pub persist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    pub max_age_minutes: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            persist: true,
            dir: None,
            max_age_minutes: 30,
        }
    }
}

impl AudioConfig {
    /// The configured cache directory, or `luna_audio` under the system temp dir.
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("luna_audio"))
    }
}

impl Config {
    /// Load `~/luna/config.json` (optional), then `.env`, then process
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = Self::config_dir()?.join(CONFIG_FILE);
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok());

        if !config.llm_enabled() {
            warn!("No LLM API key configured, agent fallback is disabled");
        }
        if !config.voice_enabled() {
            warn!("No ElevenLabs API key configured, running in text-only mode");
        }

        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!(
                "No config file at {}, using defaults. Run 'luna init' to create one.",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides. Aliases are tried in order and blank
    /// values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        if let Some(key) = first(&["LLM_API_KEY", "GOOGLE_API_KEY"]) {
            self.llm.api_key = key;
        }
        if let Some(key) = first(&["ELEVEN_API_KEY", "ELEVENLABS_API_KEY"]) {
            self.voice.api_key = key;
        }
        if let Some(voice_id) = first(&["VOICE_ID"]) {
            self.voice.voice_id = voice_id;
        }
    }

    #[must_use]
    pub fn llm_enabled(&self) -> bool {
        self.llm.api_key().is_some()
    }

    #[must_use]
    pub fn voice_enabled(&self) -> bool {
        self.voice.api_key().is_some()
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(APP_DIR))
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_path = Self::write_template(&Self::config_dir()?)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your LLM API key (or set LLM_API_KEY) to enable Luna's tools");
        println!("   2. Add your ElevenLabs API key (or set ELEVEN_API_KEY) to give Luna a voice");
        println!("   3. Run 'luna voice-test' to check the voice, then 'luna chat'");
        println!();
        println!("🔧 Configuration options:");
        println!("   - llm.model: chat model served at llm.base_url");
        println!("   - voice.voice_id: ElevenLabs voice (or set VOICE_ID)");
        println!("   - audio.max_age_minutes: how long cached replies are kept");
        println!();
        Ok(())
    }

    /// Write the template into `dir`, refusing to overwrite.
    pub fn write_template(dir: &Path) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;
        Ok(config_path)
    }
}
