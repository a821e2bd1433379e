//! Configuration management
//!
//! All credentials and initial toggles arrive via environment variables
//! (loaded from `.env` by the binary). Boolean toggles here are only the
//! process defaults; persisted runtime settings override them once loaded.

use anyhow::Result;
use std::path::PathBuf;

use crate::prompt::LanguageStrategy;

/// Bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,

    /// Gemini API key (optional - generation degrades to canned replies)
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    pub gemini_model: String,

    /// Owner user ID (grants the admin command surface)
    pub owner_id: u64,

    /// Wake word the classifier checks for (lowercase)
    pub wake_word: String,

    /// Allow light roasts in generated replies
    pub allow_insults: bool,

    /// Retaliate against insults directed at the bot
    pub retaliate: bool,

    /// Retaliate against any insult, bot-directed or not
    pub retaliate_all: bool,

    /// Initial allow_profanity value (persisted settings win once loaded)
    pub allow_profanity: bool,

    /// Reply-language policy when english_lock is off
    pub language_strategy: LanguageStrategy,

    /// Live search provider configuration
    pub search: SearchConfig,

    /// Path for the persisted settings record
    pub settings_path: PathBuf,

    /// Path for the persisted session-memory snapshot
    pub memory_path: PathBuf,
}

/// Search provider selection and credentials
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Provider name: "serpapi", "google", or empty (disabled)
    pub provider: String,
    pub serpapi_key: String,
    pub google_api_key: String,
    pub google_cse_id: String,
}

impl SearchConfig {
    /// A search backend counts as configured only when its credentials exist
    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "serpapi" => !self.serpapi_key.is_empty(),
            "google" => !self.google_api_key.is_empty() && !self.google_cse_id.is_empty(),
            _ => false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN not set"))?;

        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let owner_id = std::env::var("OWNER_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        let wake_word = std::env::var("WAKE_WORD")
            .unwrap_or_else(|_| "pappu".to_string())
            .to_lowercase();

        let search = SearchConfig {
            provider: std::env::var("SEARCH_PROVIDER")
                .unwrap_or_default()
                .to_lowercase(),
            serpapi_key: std::env::var("SERPAPI_KEY").unwrap_or_default(),
            google_api_key: std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            google_cse_id: std::env::var("GOOGLE_CSE_ID").unwrap_or_default(),
        };

        let language_strategy = match std::env::var("LANGUAGE_STRATEGY")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "auto" | "auto-detect" => LanguageStrategy::AutoDetect,
            _ => LanguageStrategy::HinglishDefault,
        };

        let settings_path = std::env::var("SETTINGS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("pappu_settings.json"));

        let memory_path = std::env::var("MEMORY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("pappu_memory.json"));

        Ok(Self {
            discord_token,
            gemini_api_key,
            gemini_model,
            owner_id,
            wake_word,
            allow_insults: env_flag("ALLOW_INSULTS"),
            retaliate: env_flag("RETALIATE"),
            retaliate_all: env_flag("RETALIATE_ALL"),
            allow_profanity: env_flag("ALLOW_PROFANITY"),
            language_strategy,
            search,
            settings_path,
            memory_path,
        })
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_id != 0 && user_id == self.owner_id
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
