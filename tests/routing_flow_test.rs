//! Routing Flow Integration Tests
//!
//! Drives the router through the public API with a recording platform:
//! persistence across process restarts and follow-up resolution against
//! session memory.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::{Mutex, Notify};

use pappubot::channels::{BanEntry, ChannelError, ChatEvent, ChatPlatform, HistoryMessage};
use pappubot::config::{Config, SearchConfig};
use pappubot::prompt::LanguageStrategy;
use pappubot::{GeminiClient, Router, SearchClient, SessionStore, SettingsStore};

const OWNER: u64 = 100;
const USER: u64 = 200;

/// Records sent messages instead of talking to Discord
#[derive(Default)]
struct RecordingPlatform {
    sent: Mutex<Vec<String>>,
}

impl RecordingPlatform {
    async fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn send_text(&self, _channel: u64, text: &str) -> Result<(), ChannelError> {
        self.sent.lock().await.push(text.to_string());
        Ok(())
    }

    async fn start_typing(&self, _channel: u64) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn set_presence(&self, _invisible: bool) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn delete_message(&self, _channel: u64, _message: u64) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn recent_history(
        &self,
        _channel: u64,
        _limit: u8,
    ) -> Result<Vec<HistoryMessage>, ChannelError> {
        Ok(Vec::new())
    }

    async fn add_role(&self, _guild: u64, _user: u64, _role: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn remove_role(&self, _guild: u64, _user: u64, _role: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn kick(&self, _guild: u64, _user: u64, _reason: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn ban(&self, _guild: u64, _user: u64, _reason: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn unban(&self, _guild: u64, _user: u64) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn list_bans(&self, _guild: u64) -> Result<Vec<BanEntry>, ChannelError> {
        Ok(Vec::new())
    }
}

fn test_config(dir: &Path) -> Config {
    Config {
        discord_token: "token".to_string(),
        gemini_api_key: None,
        gemini_model: "gemini-2.5-flash".to_string(),
        owner_id: OWNER,
        wake_word: "pappu".to_string(),
        allow_insults: false,
        retaliate: true,
        retaliate_all: false,
        allow_profanity: false,
        language_strategy: LanguageStrategy::HinglishDefault,
        search: SearchConfig::default(),
        settings_path: dir.join("settings.json"),
        memory_path: dir.join("memory.json"),
    }
}

/// Builds a router the way main() does, reloading whatever the paths hold
fn build_router(dir: &Path) -> Router {
    let config = test_config(dir);
    let settings = Arc::new(SettingsStore::load(
        &config.settings_path,
        config.allow_profanity,
    ));
    let sessions = Arc::new(SessionStore::load(&config.memory_path));
    let gemini = GeminiClient::new(config.gemini_api_key.as_deref(), &config.gemini_model);
    let search = SearchClient::new(config.search.clone());
    Router::new(
        config,
        settings,
        sessions,
        gemini,
        search,
        Arc::new(Notify::new()),
    )
}

fn guild_event(author: u64, text: &str) -> ChatEvent {
    ChatEvent {
        message_id: 1,
        author,
        author_name: if author == OWNER { "Boss" } else { "Raju" }.to_string(),
        channel: 10,
        guild: Some(99),
        text: text.to_string(),
        clean_text: text.to_string(),
        is_reply_to_bot: false,
        mentions_bot: false,
        tagged_users: vec![],
        tagged_channels: vec![],
        from_bot: false,
    }
}

#[tokio::test]
async fn test_settings_survive_simulated_restart() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let platform = RecordingPlatform::default();

    let router = build_router(temp.path());
    router
        .handle(&platform, guild_event(OWNER, "pappu mode bhaukaal"))
        .await
        .unwrap();
    router
        .handle(&platform, guild_event(OWNER, "pappu english on"))
        .await
        .unwrap();
    router.flush().await;

    // fresh "process" over the same files
    let reloaded = build_router(temp.path());
    let settings = reloaded.settings().snapshot().await;
    assert_eq!(settings.mode.as_str(), "bhaukaal");
    assert!(settings.english_lock);
}

#[tokio::test]
async fn test_session_memory_survives_simulated_restart() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let platform = RecordingPlatform::default();

    let router = build_router(temp.path());
    router
        .handle(&platform, guild_event(USER, "pappu daru suggest karo"))
        .await
        .unwrap();
    router.flush().await;

    let reloaded = build_router(temp.path());
    let ctx = reloaded
        .sessions()
        .get(USER)
        .await
        .expect("context lost across restart");
    assert_eq!(ctx.last_subject, "daru");
    assert!(ctx.items.iter().any(|i| i == "Old Monk"));
}

#[tokio::test]
async fn test_followup_resolves_against_prior_exchange() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let platform = RecordingPlatform::default();
    let router = build_router(temp.path());

    router
        .handle(&platform, guild_event(USER, "pappu daru suggest karo"))
        .await
        .unwrap();
    router
        .handle(&platform, guild_event(USER, "pappu inme se naam bta"))
        .await
        .unwrap();

    let sent = platform.sent_texts().await;
    assert_eq!(sent.len(), 2);
    // the expanded follow-up query still carries the daru topic, so the
    // degraded path answers it the same way instead of shrugging
    assert!(sent[1].contains("Old Monk"), "follow-up lost context: {}", sent[1]);
}

#[tokio::test]
async fn test_owner_dm_only_blocks_strangers_after_restart() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let platform = RecordingPlatform::default();

    let router = build_router(temp.path());
    router
        .handle(&platform, guild_event(OWNER, "pappu owner_dm on"))
        .await
        .unwrap();
    router.flush().await;

    let reloaded = build_router(temp.path());
    let blocked = RecordingPlatform::default();
    reloaded
        .handle(&blocked, guild_event(USER, "pappu kya haal hai"))
        .await
        .unwrap();

    let sent = blocked.sent_texts().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("maintenance"));
    assert!(reloaded.sessions().get(USER).await.is_none());
}
