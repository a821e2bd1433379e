//! Chat Platform Boundary
//!
//! The narrow interface the router speaks to the chat platform through:
//! one inbound event shape, one outbound operations trait, and the
//! message chunking shared by every implementation.

use async_trait::async_trait;

/// Discord caps messages at 2000; staying under leaves room for mentions
pub const MAX_MESSAGE_LEN: usize = 1900;

/// Delay between chunks of one long reply
pub const CHUNK_DELAY_MS: u64 = 250;

/// Error types for platform operations
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    #[error("member action failed: {0}")]
    MemberAction(String),

    #[error("role {0:?} not found")]
    RoleMissing(String),

    #[error("history fetch failed: {0}")]
    HistoryFailed(String),

    #[error("presence update failed: {0}")]
    PresenceFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// A user tagged in a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedUser {
    pub id: u64,
    pub display_name: String,
}

/// One inbound chat event, already normalized from the platform shape
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub message_id: u64,
    pub author: u64,
    pub author_name: String,
    pub channel: u64,
    pub guild: Option<u64>,
    /// Raw message text, mention tokens included
    pub text: String,
    /// Text with the assistant's mention tokens stripped, trimmed
    pub clean_text: String,
    /// The message replies to one of the assistant's own messages
    pub is_reply_to_bot: bool,
    /// The assistant is formally mentioned
    pub mentions_bot: bool,
    /// Tagged users, the assistant excluded
    pub tagged_users: Vec<TaggedUser>,
    /// Tagged channel IDs, in order of appearance
    pub tagged_channels: Vec<u64>,
    /// Authored by a bot account (dropped before routing)
    pub from_bot: bool,
}

impl ChatEvent {
    pub fn is_dm(&self) -> bool {
        self.guild.is_none()
    }

    /// First tagged human, the usual admin action target
    pub fn first_tagged(&self) -> Option<&TaggedUser> {
        self.tagged_users.first()
    }

    /// Target channel for channel-directed admin commands
    pub fn target_channel(&self) -> u64 {
        self.tagged_channels.first().copied().unwrap_or(self.channel)
    }
}

/// A row of fetched channel history, trimmed to what the router needs
#[derive(Debug, Clone)]
pub struct HistoryMessage {
    pub id: u64,
    pub author: u64,
    /// Authored by the assistant itself
    pub from_self: bool,
}

/// One guild ban entry
#[derive(Debug, Clone)]
pub struct BanEntry {
    pub user: u64,
    /// "name#1234" legacy tag, or just the username
    pub tag: String,
}

/// Outbound operations against the chat platform. Implementations chunk
/// long messages and enforce their own network timeouts.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Send text, chunked to the platform limit with an inter-chunk delay
    async fn send_text(&self, channel: u64, text: &str) -> Result<(), ChannelError>;

    /// Fire a short-lived typing indicator
    async fn start_typing(&self, channel: u64) -> Result<(), ChannelError>;

    /// Presence: online or invisible
    async fn set_presence(&self, invisible: bool) -> Result<(), ChannelError>;

    async fn delete_message(&self, channel: u64, message: u64) -> Result<(), ChannelError>;

    /// Recent messages, newest first
    async fn recent_history(
        &self,
        channel: u64,
        limit: u8,
    ) -> Result<Vec<HistoryMessage>, ChannelError>;

    /// Add a role found by name (e.g. "Muted")
    async fn add_role(&self, guild: u64, user: u64, role_name: &str) -> Result<(), ChannelError>;

    async fn remove_role(&self, guild: u64, user: u64, role_name: &str)
        -> Result<(), ChannelError>;

    async fn kick(&self, guild: u64, user: u64, reason: &str) -> Result<(), ChannelError>;

    async fn ban(&self, guild: u64, user: u64, reason: &str) -> Result<(), ChannelError>;

    async fn unban(&self, guild: u64, user: u64) -> Result<(), ChannelError>;

    async fn list_bans(&self, guild: u64) -> Result<Vec<BanEntry>, ChannelError>;
}

/// Split long replies at line boundaries, keeping code fences balanced
/// across chunks. Single lines longer than the limit are hard-split at a
/// char boundary so no chunk ever exceeds `max_len`.
pub fn chunk_message(content: &str, max_len: usize) -> Vec<String> {
    if content.len() <= max_len {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let fence = "```";

    for line in content.lines() {
        let mut line = line;

        // hard-split pathological single lines
        while line.len() > max_len {
            let split_at = line
                .char_indices()
                .take_while(|(i, _)| *i < max_len)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(line.len());
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.push(line[..split_at].to_string());
            line = &line[split_at..];
        }

        if current.len() + line.len() + 1 > max_len {
            let open_fences = current.matches(fence).count();
            if open_fences % 2 == 1 {
                current.push_str("\n```");
            }
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if open_fences % 2 == 1 {
                current.push_str("```\n");
            }
            current.push_str(line);
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_single_chunk() {
        let chunks = chunk_message("hello", MAX_MESSAGE_LEN);
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_chunks_respect_limit() {
        let long: String = (0..200).map(|i| format!("line number {}\n", i)).collect();
        let chunks = chunk_message(&long, 100);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 100, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn test_content_preserved_in_order() {
        let long: String = (0..50).map(|i| format!("line {}\n", i)).collect();
        let chunks = chunk_message(&long, 60);
        let rejoined = chunks.join("\n");
        assert!(rejoined.contains("line 0"));
        assert!(rejoined.contains("line 49"));
        let pos_a = rejoined.find("line 10").unwrap();
        let pos_b = rejoined.find("line 40").unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn test_code_fences_kept_balanced() {
        let mut content = String::from("```rust\n");
        for i in 0..30 {
            content.push_str(&format!("let x{} = {};\n", i, i));
        }
        content.push_str("```");

        let chunks = chunk_message(&content, 120);
        for chunk in &chunks {
            assert_eq!(
                chunk.matches("```").count() % 2,
                0,
                "unbalanced fences in chunk: {:?}",
                chunk
            );
        }
    }

    #[test]
    fn test_oversized_single_line_hard_split() {
        let line = "x".repeat(5000);
        let chunks = chunk_message(&line, MAX_MESSAGE_LEN);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.len() <= MAX_MESSAGE_LEN);
        }
    }

    #[test]
    fn test_target_channel_prefers_tagged() {
        let mut event = ChatEvent {
            message_id: 1,
            author: 2,
            author_name: "Raju".to_string(),
            channel: 10,
            guild: Some(99),
            text: String::new(),
            clean_text: String::new(),
            is_reply_to_bot: false,
            mentions_bot: false,
            tagged_users: vec![],
            tagged_channels: vec![],
            from_bot: false,
        };
        assert_eq!(event.target_channel(), 10);
        event.tagged_channels.push(42);
        assert_eq!(event.target_channel(), 42);
    }
}
