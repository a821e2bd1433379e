//! Discord Channel Implementation
//!
//! serenity-backed implementation of the `ChatPlatform` trait plus the
//! gateway event handler that normalizes incoming messages into
//! `ChatEvent`s for the router. Gateway plumbing (identify, heartbeats,
//! reconnects) stays inside serenity.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serenity::gateway::ShardMessenger;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::model::user::OnlineStatus;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::traits::{
    chunk_message, BanEntry, ChannelError, ChatEvent, ChatPlatform, HistoryMessage, TaggedUser,
    CHUNK_DELAY_MS, MAX_MESSAGE_LEN,
};
use crate::router::Router;

static CHANNEL_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<#(\d+)>").unwrap());

/// serenity-backed platform operations, built per event from the gateway
/// context so presence updates can reach the owning shard.
pub struct SerenityPlatform {
    http: Arc<Http>,
    shard: ShardMessenger,
    bot_id: u64,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, shard: ShardMessenger, bot_id: u64) -> Self {
        Self { http, shard, bot_id }
    }

    async fn role_id_by_name(
        &self,
        guild: u64,
        role_name: &str,
    ) -> Result<RoleId, ChannelError> {
        let roles = self
            .http
            .get_guild_roles(GuildId::new(guild))
            .await
            .map_err(|e| ChannelError::MemberAction(e.to_string()))?;

        roles
            .iter()
            .find(|r| r.name == role_name)
            .map(|r| r.id)
            .ok_or_else(|| ChannelError::RoleMissing(role_name.to_string()))
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn send_text(&self, channel: u64, text: &str) -> Result<(), ChannelError> {
        let chunks = chunk_message(text, MAX_MESSAGE_LEN);
        let total = chunks.len();

        for (i, chunk) in chunks.into_iter().enumerate() {
            ChannelId::new(channel)
                .say(&self.http, chunk)
                .await
                .map_err(|e| ChannelError::SendFailed(e.to_string()))?;

            if i + 1 < total {
                tokio::time::sleep(std::time::Duration::from_millis(CHUNK_DELAY_MS)).await;
            }
        }
        Ok(())
    }

    async fn start_typing(&self, channel: u64) -> Result<(), ChannelError> {
        ChannelId::new(channel)
            .broadcast_typing(&self.http)
            .await
            .map_err(|e| ChannelError::Internal(e.to_string()))
    }

    async fn set_presence(&self, invisible: bool) -> Result<(), ChannelError> {
        let status = if invisible {
            OnlineStatus::Invisible
        } else {
            OnlineStatus::Online
        };
        self.shard.set_presence(None, status);
        Ok(())
    }

    async fn delete_message(&self, channel: u64, message: u64) -> Result<(), ChannelError> {
        self.http
            .delete_message(ChannelId::new(channel), MessageId::new(message), None)
            .await
            .map_err(|e| ChannelError::DeleteFailed(e.to_string()))
    }

    async fn recent_history(
        &self,
        channel: u64,
        limit: u8,
    ) -> Result<Vec<HistoryMessage>, ChannelError> {
        let messages = self
            .http
            .get_messages(ChannelId::new(channel), None, Some(limit))
            .await
            .map_err(|e| ChannelError::HistoryFailed(e.to_string()))?;

        Ok(messages
            .into_iter()
            .map(|m| HistoryMessage {
                id: m.id.get(),
                author: m.author.id.get(),
                from_self: m.author.id.get() == self.bot_id,
            })
            .collect())
    }

    async fn add_role(&self, guild: u64, user: u64, role_name: &str) -> Result<(), ChannelError> {
        let role_id = self.role_id_by_name(guild, role_name).await?;
        self.http
            .add_member_role(
                GuildId::new(guild),
                UserId::new(user),
                role_id,
                Some("Owner mute via Pappu"),
            )
            .await
            .map_err(|e| ChannelError::MemberAction(e.to_string()))
    }

    async fn remove_role(
        &self,
        guild: u64,
        user: u64,
        role_name: &str,
    ) -> Result<(), ChannelError> {
        let role_id = self.role_id_by_name(guild, role_name).await?;
        self.http
            .remove_member_role(
                GuildId::new(guild),
                UserId::new(user),
                role_id,
                Some("Owner unmute via Pappu"),
            )
            .await
            .map_err(|e| ChannelError::MemberAction(e.to_string()))
    }

    async fn kick(&self, guild: u64, user: u64, reason: &str) -> Result<(), ChannelError> {
        GuildId::new(guild)
            .kick_with_reason(&self.http, UserId::new(user), reason)
            .await
            .map_err(|e| ChannelError::MemberAction(e.to_string()))
    }

    async fn ban(&self, guild: u64, user: u64, reason: &str) -> Result<(), ChannelError> {
        GuildId::new(guild)
            .ban_with_reason(&self.http, UserId::new(user), 0, reason)
            .await
            .map_err(|e| ChannelError::MemberAction(e.to_string()))
    }

    async fn unban(&self, guild: u64, user: u64) -> Result<(), ChannelError> {
        GuildId::new(guild)
            .unban(&self.http, UserId::new(user))
            .await
            .map_err(|e| ChannelError::MemberAction(e.to_string()))
    }

    async fn list_bans(&self, guild: u64) -> Result<Vec<BanEntry>, ChannelError> {
        let bans = self
            .http
            .get_bans(GuildId::new(guild), None, None)
            .await
            .map_err(|e| ChannelError::MemberAction(e.to_string()))?;

        Ok(bans
            .into_iter()
            .map(|ban| BanEntry {
                user: ban.user.id.get(),
                tag: ban.user.tag(),
            })
            .collect())
    }
}

/// Gateway event handler: drops bot traffic, normalizes the rest, and hands
/// each event to the router on its own task.
pub struct Handler {
    router: Arc<Router>,
}

impl Handler {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }
}

/// Parse `<#123>` channel tags out of raw message content
pub fn parse_channel_tags(content: &str) -> Vec<u64> {
    CHANNEL_TAG
        .captures_iter(content)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

/// Normalize a serenity message into the router's event shape
pub fn to_chat_event(msg: &Message, bot_id: u64) -> ChatEvent {
    let tagged_users = msg
        .mentions
        .iter()
        .filter(|u| u.id.get() != bot_id)
        .map(|u| TaggedUser {
            id: u.id.get(),
            display_name: u.global_name.as_deref().unwrap_or(&u.name).to_string(),
        })
        .collect();

    let clean_text = msg
        .content
        .replace(&format!("<@{}>", bot_id), "")
        .replace(&format!("<@!{}>", bot_id), "")
        .trim()
        .to_string();

    ChatEvent {
        message_id: msg.id.get(),
        author: msg.author.id.get(),
        author_name: msg
            .author
            .global_name
            .as_deref()
            .unwrap_or(&msg.author.name)
            .to_string(),
        channel: msg.channel_id.get(),
        guild: msg.guild_id.map(|g| g.get()),
        text: msg.content.to_string(),
        clean_text,
        is_reply_to_bot: msg
            .referenced_message
            .as_ref()
            .map(|m| m.author.id.get() == bot_id)
            .unwrap_or(false),
        mentions_bot: msg.mentions_user_id(UserId::new(bot_id)),
        tagged_users,
        tagged_channels: parse_channel_tags(&msg.content),
        from_bot: msg.author.bot,
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} online hai Papa ji!", ready.user.name);

        // Honor the persisted stealth flag from the first heartbeat
        let stealth = self.router.settings().snapshot().await.stealth;
        let status = if stealth {
            OnlineStatus::Invisible
        } else {
            OnlineStatus::Online
        };
        ctx.set_presence(None, status);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let bot_id = ctx.cache.current_user().id.get();
        let event = to_chat_event(&msg, bot_id);
        let platform = SerenityPlatform::new(ctx.http.clone(), ctx.shard.clone(), bot_id);

        if let Err(e) = self.router.handle(&platform, event).await {
            error!("Message handling failed: {}", e);
            if let Err(send_err) = msg
                .channel_id
                .say(&ctx.http, "Kuch gadbad ho gayi, dobara try karo. 🙏")
                .await
            {
                warn!("Failed to send error notice: {}", send_err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_tag_parsing() {
        assert_eq!(parse_channel_tags("announce in <#123> please"), vec![123]);
        assert_eq!(
            parse_channel_tags("<#1> and <#2>"),
            vec![1, 2]
        );
        assert!(parse_channel_tags("no tags here").is_empty());
    }
}
