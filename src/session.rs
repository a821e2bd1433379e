//! Session Context Store
//!
//! Short-lived per-user memory of the last topic, query, and labeled result
//! items, used only to resolve elliptical follow-up messages ("which one?").
//! Entries expire after a fixed TTL and are purged lazily on read rather
//! than by a background sweep.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Context TTL in seconds (6 hours)
pub const CONTEXT_TTL_SECS: i64 = 60 * 60 * 6;

/// Most items kept per entry
const MAX_ITEMS: usize = 10;

/// Items woven into a follow-up expansion
const FOLLOWUP_ITEMS: usize = 6;

/// Per-user conversational context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Coarse topic tag from the last substantive query
    pub last_subject: String,

    /// The verbatim previous query (or assembled follow-up chain)
    pub last_query: String,

    /// Short labeled items extracted from the last response
    #[serde(default)]
    pub items: Vec<String>,

    /// Last-write time, unix seconds
    pub ts: i64,
}

/// In-memory session store keyed by user ID, with JSON snapshots for the
/// periodic flush alongside settings.
pub struct SessionStore {
    path: PathBuf,
    ttl_secs: i64,
    entries: RwLock<HashMap<u64, SessionContext>>,
}

impl SessionStore {
    /// Load the prior snapshot if present; malformed or absent files start
    /// empty with a logged warning.
    pub fn load(path: &Path) -> Self {
        Self::load_with_ttl(path, CONTEXT_TTL_SECS)
    }

    pub fn load_with_ttl(path: &Path, ttl_secs: i64) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, SessionContext>>(&raw) {
                Ok(map) => map
                    .into_iter()
                    .filter_map(|(k, v)| k.parse::<u64>().ok().map(|id| (id, v)))
                    .collect(),
                Err(e) => {
                    warn!("Malformed memory file {}: {} (starting empty)", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path: path.to_path_buf(),
            ttl_secs,
            entries: RwLock::new(entries),
        }
    }

    /// Overwrite the entry for `user_id` with the current timestamp.
    /// Items are deduplicated case-insensitively, then truncated.
    pub async fn set(&self, user_id: u64, subject: &str, query: &str, items: Vec<String>) {
        let mut deduped: Vec<String> = Vec::new();
        for item in items {
            let trimmed = item.trim().to_string();
            if trimmed.is_empty() {
                continue;
            }
            if !deduped.iter().any(|seen| seen.eq_ignore_ascii_case(&trimmed)) {
                deduped.push(trimmed);
            }
            if deduped.len() >= MAX_ITEMS {
                break;
            }
        }

        let entry = SessionContext {
            last_subject: subject.to_string(),
            last_query: query.to_string(),
            items: deduped,
            ts: chrono::Utc::now().timestamp(),
        };

        self.entries.write().await.insert(user_id, entry);
        debug!("Session context set for user {}", user_id);
    }

    /// Purge every expired entry across the store, then return the caller's
    /// entry if it survived.
    pub async fn get(&self, user_id: u64) -> Option<SessionContext> {
        let now = chrono::Utc::now().timestamp();
        let ttl = self.ttl_secs;

        let mut entries = self.entries.write().await;
        entries.retain(|_, ctx| now - ctx.ts <= ttl);
        entries.get(&user_id).cloned()
    }

    /// Effective query for a short follow-up: prior query, up to six prior
    /// items, and the new message, concatenated so the generator can resolve
    /// the ellipsis.
    pub fn expand_followup(ctx: &SessionContext, new_text: &str) -> String {
        if ctx.items.is_empty() {
            return format!("{} — user follow-up: {}", ctx.last_query, new_text);
        }
        let items: Vec<&str> = ctx
            .items
            .iter()
            .take(FOLLOWUP_ITEMS)
            .map(|s| s.as_str())
            .collect();
        format!(
            "{} — items: {} — follow-up: {}",
            ctx.last_query,
            items.join(", "),
            new_text
        )
    }

    /// Serialize the whole map to the memory file. Best effort.
    pub async fn save(&self) {
        let snapshot: HashMap<String, SessionContext> = {
            let entries = self.entries.read().await;
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect()
        };
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!("Failed to persist session memory to {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize session memory: {}", e),
        }
    }

    /// Number of live (possibly expired, not yet purged) entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(ttl: i64) -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::load_with_ttl(&dir.path().join("memory.json"), ttl);
        (dir, store)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (_dir, store) = temp_store(CONTEXT_TTL_SECS);
        store
            .set(1, "daru", "daru suggest karo", vec!["Old Monk".to_string()])
            .await;

        let ctx = store.get(1).await.unwrap();
        assert_eq!(ctx.last_subject, "daru");
        assert_eq!(ctx.items, vec!["Old Monk"]);
    }

    #[tokio::test]
    async fn test_items_deduped_and_truncated() {
        let (_dir, store) = temp_store(CONTEXT_TTL_SECS);
        let mut items: Vec<String> = (0..15).map(|i| format!("Item {}", i)).collect();
        items.insert(1, "item 0".to_string()); // case-insensitive duplicate

        store.set(1, "phone", "phone batao", items).await;
        let ctx = store.get(1).await.unwrap();
        assert_eq!(ctx.items.len(), 10);
        assert_eq!(ctx.items[0], "Item 0");
        assert_eq!(ctx.items[1], "Item 1");
    }

    #[tokio::test]
    async fn test_expired_entry_is_purged_on_read() {
        let (_dir, store) = temp_store(0);
        store.set(1, "movie", "movie batao", vec![]).await;

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert!(store.get(1).await.is_none());
        // purge is a side effect, not just a filtered view
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_sweeps_other_users() {
        let (_dir, store) = temp_store(0);
        store.set(1, "a", "q1", vec![]).await;
        store.set(2, "b", "q2", vec![]).await;

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let _ = store.get(999).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_followup_expansion_contains_all_parts() {
        let ctx = SessionContext {
            last_subject: "daru".to_string(),
            last_query: "daru suggest karo".to_string(),
            items: vec!["Old Monk".to_string(), "Magic Moments".to_string()],
            ts: chrono::Utc::now().timestamp(),
        };

        let expanded = SessionStore::expand_followup(&ctx, "inme se kaun sasta hai");
        assert!(expanded.contains("daru suggest karo"));
        assert!(expanded.contains("Old Monk"));
        assert!(expanded.contains("inme se kaun sasta hai"));
    }

    #[tokio::test]
    async fn test_followup_expansion_caps_items() {
        let ctx = SessionContext {
            last_subject: "phone".to_string(),
            last_query: "phone options".to_string(),
            items: (0..10).map(|i| format!("Phone{}", i)).collect(),
            ts: chrono::Utc::now().timestamp(),
        };

        let expanded = SessionStore::expand_followup(&ctx, "kaun sa");
        assert!(expanded.contains("Phone5"));
        assert!(!expanded.contains("Phone6"));
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");

        let store = SessionStore::load(&path);
        store
            .set(7, "laptop", "laptop under 50k", vec!["ThinkPad".to_string()])
            .await;
        store.save().await;

        let reloaded = SessionStore::load(&path);
        let ctx = reloaded.get(7).await.unwrap();
        assert_eq!(ctx.last_query, "laptop under 50k");
        assert_eq!(ctx.items, vec!["ThinkPad"]);
    }
}
