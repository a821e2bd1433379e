//! Runtime Settings Store
//!
//! Process-wide mutable flags (reply mode, locks, toggles), loaded at
//! startup, mutated by owner admin commands, and persisted to a JSON file
//! after every mutation plus on a periodic autosave timer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Reply tone mode. `bhai-ji` keeps its hyphen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Funny,
    Angry,
    Serious,
    Flirty,
    Sarcastic,
    Bhaukaal,
    Kid,
    Toxic,
    Coder,
    #[serde(rename = "bhai-ji")]
    BhaiJi,
    Dark,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Funny => "funny",
            Mode::Angry => "angry",
            Mode::Serious => "serious",
            Mode::Flirty => "flirty",
            Mode::Sarcastic => "sarcastic",
            Mode::Bhaukaal => "bhaukaal",
            Mode::Kid => "kid",
            Mode::Toxic => "toxic",
            Mode::Coder => "coder",
            Mode::BhaiJi => "bhai-ji",
            Mode::Dark => "dark",
        }
    }

    /// Parse a mode name, normalizing the accepted aliases
    /// ("mafia" -> bhaukaal, "normal" -> funny). Unknown names yield None.
    pub fn parse(candidate: &str) -> Option<Mode> {
        let normalized = match candidate.to_lowercase().as_str() {
            "mafia" => "bhaukaal".to_string(),
            "normal" => "funny".to_string(),
            other => other.to_string(),
        };
        match normalized.as_str() {
            "funny" => Some(Mode::Funny),
            "angry" => Some(Mode::Angry),
            "serious" => Some(Mode::Serious),
            "flirty" => Some(Mode::Flirty),
            "sarcastic" => Some(Mode::Sarcastic),
            "bhaukaal" => Some(Mode::Bhaukaal),
            "kid" => Some(Mode::Kid),
            "toxic" => Some(Mode::Toxic),
            "coder" => Some(Mode::Coder),
            "bhai-ji" => Some(Mode::BhaiJi),
            "dark" => Some(Mode::Dark),
            _ => None,
        }
    }
}

/// The persisted settings record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// When true, non-owner messages outside DMs are dropped
    #[serde(default)]
    pub owner_dm_only: bool,

    /// Presence hint only (invisible status), no routing coupling
    #[serde(default)]
    pub stealth: bool,

    /// Active reply tone
    #[serde(default = "default_mode")]
    pub mode: Mode,

    /// Gates the profane roast template pool
    #[serde(default)]
    pub allow_profanity: bool,

    /// Forces reply language to English regardless of input
    #[serde(default)]
    pub english_lock: bool,
}

fn default_mode() -> Mode {
    Mode::Funny
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner_dm_only: false,
            stealth: false,
            mode: Mode::Funny,
            allow_profanity: false,
            english_lock: false,
        }
    }
}

/// On-disk wrapper, matching the settings file layout
#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: Settings,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
        }
    }
}

/// Settings store with save-on-mutation and a dirty flag for the
/// periodic flush safety net.
pub struct SettingsStore {
    path: PathBuf,
    inner: RwLock<Settings>,
    dirty: AtomicBool,
}

impl SettingsStore {
    /// Load prior persisted state. Absent or malformed files fall back to
    /// defaults with a logged warning - never an error to the caller.
    pub fn load(path: &Path, initial_allow_profanity: bool) -> Self {
        let settings = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<SettingsFile>(&raw) {
                Ok(file) => file.settings,
                Err(e) => {
                    warn!("Malformed settings file {}: {} (using defaults)", path.display(), e);
                    Settings::default()
                }
            },
            Err(_) => Settings {
                allow_profanity: initial_allow_profanity,
                ..Settings::default()
            },
        };

        Self {
            path: path.to_path_buf(),
            inner: RwLock::new(settings),
            dirty: AtomicBool::new(false),
        }
    }

    /// Current settings snapshot
    pub async fn snapshot(&self) -> Settings {
        self.inner.read().await.clone()
    }

    /// Apply a mode candidate. Returns false (no mutation, no save) when the
    /// normalized name is not in the accepted set.
    pub async fn apply_mode(&self, candidate: &str) -> bool {
        let Some(mode) = Mode::parse(candidate) else {
            return false;
        };
        {
            let mut settings = self.inner.write().await;
            settings.mode = mode;
            // Savage modes stay publicly visible
            if matches!(mode, Mode::Angry | Mode::Toxic) {
                settings.owner_dm_only = false;
            }
        }
        self.mark_dirty_and_save().await;
        true
    }

    pub async fn set_owner_dm_only(&self, on: bool) {
        self.inner.write().await.owner_dm_only = on;
        self.mark_dirty_and_save().await;
    }

    pub async fn set_stealth(&self, on: bool) {
        self.inner.write().await.stealth = on;
        self.mark_dirty_and_save().await;
    }

    pub async fn set_english_lock(&self, on: bool) {
        self.inner.write().await.english_lock = on;
        self.mark_dirty_and_save().await;
    }

    pub async fn set_allow_profanity(&self, on: bool) {
        self.inner.write().await.allow_profanity = on;
        self.mark_dirty_and_save().await;
    }

    /// Serialize the full record to disk. Best effort: failure is logged,
    /// never escalated, and the in-memory state stays applied.
    pub async fn save(&self) {
        let snapshot = self.inner.read().await.clone();
        let file = SettingsFile { settings: snapshot };
        match serde_json::to_string_pretty(&file) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!("Failed to persist settings to {}: {}", self.path.display(), e);
                } else {
                    self.dirty.store(false, Ordering::Relaxed);
                    debug!("Settings persisted to {}", self.path.display());
                }
            }
            Err(e) => warn!("Failed to serialize settings: {}", e),
        }
    }

    /// Whether a mutation happened since the last successful save
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    async fn mark_dirty_and_save(&self) {
        self.dirty.store(true, Ordering::Relaxed);
        self.save().await;
    }
}
