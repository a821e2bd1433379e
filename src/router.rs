//! Response Router
//!
//! Orchestrates classifier output against Settings and Session Context to
//! decide what one inbound message becomes: silence, a canned reply, a
//! roast, an admin action, or a generation request (optionally grounded by
//! live search). Holds no persisted state of its own.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, error, info, warn};

use crate::channels::traits::{ChannelError, ChatEvent, ChatPlatform};
use crate::config::Config;
use crate::extract::{extract_items, extract_subject, MAX_REPLY_ITEMS};
use crate::gemini::GeminiClient;
use crate::intent::{contains_insult, AdminCommand, Classifier, ClassifyInput, Intent};
use crate::prompt::{build_announcement_prompt, build_normal_prompt, choose_roast, PromptInput};
use crate::search::{summarize, SearchClient};
use crate::session::SessionStore;
use crate::settings::SettingsStore;

const MAINTENANCE_NOTICE: &str =
    "Papa ji, maintenance mode chalu hai — abhi sirf owner se reply karta hoon.";

const SEARCH_NOT_CONFIGURED: &str =
    "Live search not configured. Set SEARCH_PROVIDER and keys in .env.";

const NO_SEARCH_RESULTS: &str = "Koi acha result nahi mila.";

const GEMINI_MISSING: &str =
    "Papa ji, Gemini key missing hai, isliye simple reply de paunga. Topic batao.";

const BLANK_REPLY: &str = "Papa ji, kuch blank sa aa gaya, dobara bhejo.";

/// Excerpts longer than this get cut at a word boundary
const LYRICS_EXCERPT_LIMIT: usize = 90;

/// Minimum gap between roasts aimed at the same user
const RETALIATE_GAP: Duration = Duration::from_secs(30);

/// Per-user cooldown so the roast path cannot be farmed
struct RetaliateGuard {
    min_gap: Duration,
    last: RwLock<HashMap<u64, Instant>>,
}

impl RetaliateGuard {
    fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last: RwLock::new(HashMap::new()),
        }
    }

    async fn allow(&self, user_id: u64) -> bool {
        let mut last = self.last.write().await;
        let now = Instant::now();
        let allowed = last
            .get(&user_id)
            .map(|prev| now.duration_since(*prev) >= self.min_gap)
            .unwrap_or(true);
        if allowed {
            last.insert(user_id, now);
        }
        allowed
    }
}

/// The message-routing engine. One instance per process, shared across
/// gateway tasks.
pub struct Router {
    config: Config,
    classifier: Classifier,
    settings: Arc<SettingsStore>,
    sessions: Arc<SessionStore>,
    gemini: GeminiClient,
    search: SearchClient,
    retaliate_guard: RetaliateGuard,
    shutdown: Arc<Notify>,
}

impl Router {
    pub fn new(
        config: Config,
        settings: Arc<SettingsStore>,
        sessions: Arc<SessionStore>,
        gemini: GeminiClient,
        search: SearchClient,
        shutdown: Arc<Notify>,
    ) -> Self {
        let classifier = Classifier::new(&config.wake_word);
        Self {
            config,
            classifier,
            settings,
            sessions,
            gemini,
            search,
            retaliate_guard: RetaliateGuard::new(RETALIATE_GAP),
            shutdown,
        }
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Route one inbound event. Every failure is resolved here into a chat
    /// reply or a log line; nothing propagates past this message's task.
    pub async fn handle(&self, platform: &dyn ChatPlatform, event: ChatEvent) -> Result<()> {
        if event.from_bot {
            return Ok(());
        }

        let is_owner = self.config.is_owner(event.author);
        let content_lower = event.text.to_lowercase();
        let wake_present = content_lower.contains(&self.config.wake_word);
        let invoked = wake_present || event.mentions_bot;

        // Roast-anyone mode reacts even without an invocation
        if self.config.retaliate_all && !is_owner && contains_insult(&event.text) {
            return self.retaliate(platform, &event).await;
        }

        if !invoked && !(event.is_reply_to_bot && contains_insult(&event.text)) {
            return Ok(());
        }

        let settings = self.settings.snapshot().await;
        if settings.owner_dm_only && !is_owner && !event.is_dm() {
            self.send(platform, event.channel, MAINTENANCE_NOTICE).await;
            return Ok(());
        }

        let context = self.sessions.get(event.author).await;
        let input = ClassifyInput {
            text: &event.clean_text,
            is_owner,
            in_guild: event.guild.is_some(),
            is_reply_to_bot: event.is_reply_to_bot,
            wake_word_present: wake_present,
            has_other_tagged: !event.tagged_users.is_empty(),
            has_context: context.is_some(),
            search_configured: self.search.is_configured(),
        };

        let intent = self.classifier.classify(&input);
        debug!("Classified message from {} as {:?}", event.author, intent);

        match intent {
            Intent::Admin(cmd) => self.dispatch_admin(platform, &event, cmd).await,
            Intent::Insult => {
                if self.config.retaliate {
                    self.retaliate(platform, &event).await
                } else {
                    // retaliation disabled: treat it as any other message
                    self.compose_chat(platform, &event, &event.clean_text).await
                }
            }
            Intent::Greeting => {
                let name = self.title_for(&event);
                self.send(
                    platform,
                    event.channel,
                    &format!("Haan {}, bol kya scene hai? 😎", name),
                )
                .await;
                Ok(())
            }
            Intent::FollowUp => match context {
                Some(ctx) => {
                    let effective = SessionStore::expand_followup(&ctx, &event.clean_text);
                    self.compose_chat(platform, &event, &effective).await
                }
                None => self.compose_chat(platform, &event, &event.clean_text).await,
            },
            Intent::Lyrics { song } => self.compose_lyrics(platform, &event, &song).await,
            Intent::LiveInfo => self.compose_live(platform, &event).await,
            Intent::Chat => self.compose_chat(platform, &event, &event.clean_text).await,
        }
    }

    fn title_for(&self, event: &ChatEvent) -> String {
        if self.config.is_owner(event.author) {
            "Papa ji".to_string()
        } else {
            event.author_name.clone()
        }
    }

    /// Send with the standard logging; send failures never bubble up
    async fn send(&self, platform: &dyn ChatPlatform, channel: u64, text: &str) {
        if let Err(e) = platform.send_text(channel, text).await {
            error!("Failed to send reply: {}", e);
        }
    }

    // ── Retaliate ────────────────────────────────────────────────────────

    async fn retaliate(&self, platform: &dyn ChatPlatform, event: &ChatEvent) -> Result<()> {
        if !self.retaliate_guard.allow(event.author).await {
            debug!("Retaliation cooldown active for {}", event.author);
            return Ok(());
        }
        let profane = self.settings.snapshot().await.allow_profanity;
        let roast = choose_roast(&event.author_name, profane);
        self.send(platform, event.channel, &roast).await;
        Ok(())
    }

    // ── AdminDispatch ────────────────────────────────────────────────────

    async fn dispatch_admin(
        &self,
        platform: &dyn ChatPlatform,
        event: &ChatEvent,
        cmd: AdminCommand,
    ) -> Result<()> {
        let wake = &self.config.wake_word;
        match cmd {
            AdminCommand::Shutdown => {
                self.send(platform, event.channel, "Theek hai Papa ji, going offline. 👋")
                    .await;
                self.flush().await;
                info!("Owner requested shutdown");
                self.shutdown.notify_one();
            }
            AdminCommand::Restart => {
                self.send(platform, event.channel, "Restarting now, Papa ji... 🔁")
                    .await;
                self.flush().await;
                info!("Owner requested restart; handing off to supervisor");
                self.shutdown.notify_one();
            }
            AdminCommand::OwnerDmOnly(Some(on)) => {
                self.settings.set_owner_dm_only(on).await;
                let reply = if on {
                    "Owner DM only mode ON. Sirf Papa ji ke DMs reply karunga."
                } else {
                    "Owner DM only mode OFF. Normal mode."
                };
                self.send(platform, event.channel, reply).await;
            }
            AdminCommand::OwnerDmOnly(None) => {
                self.send(
                    platform,
                    event.channel,
                    &format!("Use: `{wake} owner_dm on` or `{wake} owner_dm off`"),
                )
                .await;
            }
            AdminCommand::Stealth(Some(on)) => {
                self.settings.set_stealth(on).await;
                if let Err(e) = platform.set_presence(on).await {
                    warn!("Presence update failed: {}", e);
                }
                let reply = if on {
                    "Stealth ON. Trying to hide status (best effort)."
                } else {
                    "Stealth OFF. Back to normal status."
                };
                self.send(platform, event.channel, reply).await;
            }
            AdminCommand::Stealth(None) => {
                self.send(
                    platform,
                    event.channel,
                    &format!("Use: `{wake} stealth on` or `{wake} stealth off`"),
                )
                .await;
            }
            AdminCommand::Mode(candidate) => {
                let applied = match candidate.as_deref() {
                    Some(name) => self.settings.apply_mode(name).await.then_some(name),
                    None => None,
                };
                match applied {
                    Some(name) => {
                        self.send(
                            platform,
                            event.channel,
                            &format!("Mode set to `{}`. Applied.", name),
                        )
                        .await;
                    }
                    None => {
                        self.send(
                            platform,
                            event.channel,
                            &format!(
                                "Usage: `{wake} mode funny|angry|serious|flirty|sarcastic|bhaukaal|kid|toxic|coder|bhai-ji|dark`"
                            ),
                        )
                        .await;
                    }
                }
            }
            AdminCommand::EnglishLock(Some(on)) => {
                self.settings.set_english_lock(on).await;
                let reply = if on {
                    "English-Lock ON. Ab Pappu sirf English me reply karega. 🇬🇧"
                } else {
                    "English-Lock OFF. Ab Pappu wapas Hinglish pe aa gaya. 🔄"
                };
                self.send(platform, event.channel, reply).await;
            }
            AdminCommand::EnglishLock(None) => {
                self.send(
                    platform,
                    event.channel,
                    &format!("Use: `{wake} english on` / `{wake} english off`"),
                )
                .await;
            }
            AdminCommand::AllowProfanity(Some(on)) => {
                self.settings.set_allow_profanity(on).await;
                let reply = if on {
                    "ALLOW_PROFANITY set to ON for this session. (Persisted.)"
                } else {
                    "ALLOW_PROFANITY set to OFF for this session."
                };
                self.send(platform, event.channel, reply).await;
            }
            AdminCommand::AllowProfanity(None) => {
                self.send(
                    platform,
                    event.channel,
                    &format!("Use: `{wake} allow_profanity on` or `{wake} allow_profanity off`"),
                )
                .await;
            }
            AdminCommand::DeleteLast => {
                self.delete_last_bot_message(platform, event).await;
            }
            AdminCommand::Announcement(topic) => {
                if topic.is_empty() {
                    self.send(
                        platform,
                        event.channel,
                        "Kis topic pe announcement chahiye Papa ji?",
                    )
                    .await;
                } else {
                    self.compose_announcement(platform, event, &topic).await;
                }
            }
            AdminCommand::Unmute => {
                self.member_role_action(platform, event, false).await;
            }
            AdminCommand::Mute => {
                self.member_role_action(platform, event, true).await;
            }
            AdminCommand::Kick => {
                let Some(guild) = event.guild else { return Ok(()) };
                let Some(target) = event.first_tagged() else {
                    self.send(platform, event.channel, "Kisko kick karna hai Papa ji? @mention karo.")
                        .await;
                    return Ok(());
                };
                match platform.kick(guild, target.id, "Owner kick via Pappu").await {
                    Ok(()) => {
                        self.send(
                            platform,
                            event.channel,
                            &format!("{} ko kick kar diya.", target.display_name),
                        )
                        .await;
                    }
                    Err(e) => self.send_action_error(platform, event.channel, &e).await,
                }
            }
            AdminCommand::Ban => {
                let Some(guild) = event.guild else { return Ok(()) };
                let Some(target) = event.first_tagged() else {
                    self.send(platform, event.channel, "Kisko ban karna hai Papa ji? @mention karo.")
                        .await;
                    return Ok(());
                };
                match platform.ban(guild, target.id, "Owner ban via Pappu").await {
                    Ok(()) => {
                        self.send(
                            platform,
                            event.channel,
                            &format!("{} ko ban kar diya.", target.display_name),
                        )
                        .await;
                    }
                    Err(e) => self.send_action_error(platform, event.channel, &e).await,
                }
            }
            AdminCommand::Unban => {
                self.unban_member(platform, event).await;
            }
            AdminCommand::Roast => {
                let Some(target) = event.first_tagged() else {
                    self.send(
                        platform,
                        event.channel,
                        "Kisko insult bhejna hai Papa ji? @mention karke bolo.",
                    )
                    .await;
                    return Ok(());
                };
                let profane = self.settings.snapshot().await.allow_profanity;
                let roast = choose_roast(&target.display_name, profane);
                self.send(platform, event.channel, &roast).await;
            }
        }
        Ok(())
    }

    async fn member_role_action(
        &self,
        platform: &dyn ChatPlatform,
        event: &ChatEvent,
        mute: bool,
    ) {
        let Some(guild) = event.guild else { return };
        let Some(target) = event.first_tagged() else {
            let prompt = if mute {
                "Kisko mute karna hai Papa ji? @mention karo."
            } else {
                "Kisko unmute karna hai Papa ji? @mention karo."
            };
            self.send(platform, event.channel, prompt).await;
            return;
        };

        let result = if mute {
            platform.add_role(guild, target.id, "Muted").await
        } else {
            platform.remove_role(guild, target.id, "Muted").await
        };

        match result {
            Ok(()) => {
                let reply = if mute {
                    format!("<@{}> ko mute kar diya.", target.id)
                } else {
                    format!("<@{}> ka mute hata diya.", target.id)
                };
                self.send(platform, event.channel, &reply).await;
            }
            Err(ChannelError::RoleMissing(_)) => {
                self.send(platform, event.channel, "Muted role nahi mila, pehle role banao.")
                    .await;
            }
            Err(e) => self.send_action_error(platform, event.channel, &e).await,
        }
    }

    async fn delete_last_bot_message(&self, platform: &dyn ChatPlatform, event: &ChatEvent) {
        let target_channel = event.target_channel();
        let history = match platform.recent_history(target_channel, 50).await {
            Ok(h) => h,
            Err(e) => {
                self.send_action_error(platform, event.channel, &e).await;
                return;
            }
        };

        let Some(own) = history.iter().find(|m| m.from_self) else {
            self.send(platform, event.channel, "Papa ji, last Pappu message nahi mila.")
                .await;
            return;
        };

        match platform.delete_message(target_channel, own.id).await {
            Ok(()) => {
                self.send(
                    platform,
                    event.channel,
                    &format!(
                        "Theek hai Papa ji, <#{}> me Pappu ka last message delete kar diya.",
                        target_channel
                    ),
                )
                .await;
            }
            Err(e) => self.send_action_error(platform, event.channel, &e).await,
        }
    }

    async fn unban_member(&self, platform: &dyn ChatPlatform, event: &ChatEvent) {
        let Some(guild) = event.guild else { return };

        // "user#1234" or a raw ID, else a tagged user
        let target_ref = event
            .clean_text
            .split_whitespace()
            .find(|p| p.contains('#') || p.chars().all(|c| c.is_ascii_digit()) && !p.is_empty())
            .map(|s| s.to_string());

        if target_ref.is_none() && event.first_tagged().is_none() {
            self.send(platform, event.channel, "Kisko unban karna hai? user#1234 ya id batao.")
                .await;
            return;
        }

        let bans = match platform.list_bans(guild).await {
            Ok(b) => b,
            Err(e) => {
                self.send_action_error(platform, event.channel, &e).await;
                return;
            }
        };

        let found = if let Some(tagged) = event.first_tagged() {
            bans.iter().find(|b| b.user == tagged.id)
        } else {
            let wanted = target_ref.as_deref().unwrap_or_default();
            bans.iter().find(|b| {
                (wanted.chars().all(|c| c.is_ascii_digit())
                    && wanted.parse::<u64>().map(|id| id == b.user).unwrap_or(false))
                    || wanted.eq_ignore_ascii_case(&b.tag)
            })
        };

        let Some(entry) = found else {
            self.send(platform, event.channel, "Ban list me user nahi mila.").await;
            return;
        };

        match platform.unban(guild, entry.user).await {
            Ok(()) => {
                self.send(
                    platform,
                    event.channel,
                    &format!("{} ko unban kar diya.", entry.tag),
                )
                .await;
            }
            Err(e) => self.send_action_error(platform, event.channel, &e).await,
        }
    }

    async fn send_action_error(
        &self,
        platform: &dyn ChatPlatform,
        channel: u64,
        err: &ChannelError,
    ) {
        self.send(platform, channel, &format!("Error: `{}`", err)).await;
    }

    // ── Compose ──────────────────────────────────────────────────────────

    /// Normal / follow-up conversational path
    async fn compose_chat(
        &self,
        platform: &dyn ChatPlatform,
        event: &ChatEvent,
        effective_text: &str,
    ) -> Result<()> {
        if !self.gemini.is_available() {
            self.degraded_reply(platform, event, effective_text).await;
            return Ok(());
        }

        let subject = extract_subject(effective_text);
        if !subject.is_empty() {
            self.sessions
                .set(event.author, subject, effective_text, Vec::new())
                .await;
        }

        let settings = self.settings.snapshot().await;
        let prompt = build_normal_prompt(
            &PromptInput {
                user_name: &event.author_name,
                text: effective_text,
                is_owner: self.config.is_owner(event.author),
                allow_insults: self.config.allow_insults,
                search_summary: None,
            },
            &settings,
            self.config.language_strategy,
        );

        let _ = platform.start_typing(event.channel).await;

        match self.gemini.generate(&prompt).await {
            Ok(reply) => {
                let reply = if reply.trim().is_empty() {
                    BLANK_REPLY.to_string()
                } else {
                    reply
                };
                self.send(platform, event.channel, &reply).await;
                self.remember_exchange(event.author, effective_text, &reply).await;
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                self.send(
                    platform,
                    event.channel,
                    &format!("Kuch error aa gaya Papa ji: `{}`", e),
                )
                .await;
            }
        }
        Ok(())
    }

    /// Live-information path: search first, then ground the generation
    async fn compose_live(&self, platform: &dyn ChatPlatform, event: &ChatEvent) -> Result<()> {
        let text = event.clean_text.clone();
        let _ = platform.start_typing(event.channel).await;

        let hits = match self.search.search(&text).await {
            Ok(hits) => hits,
            Err(e) => {
                error!("Search failed: {}", e);
                self.send(
                    platform,
                    event.channel,
                    &format!("Kuch error aa gaya Papa ji: `{}`", e),
                )
                .await;
                return Ok(());
            }
        };

        if hits.is_empty() {
            let notice = if self.search.is_configured() {
                NO_SEARCH_RESULTS
            } else {
                SEARCH_NOT_CONFIGURED
            };
            self.send(platform, event.channel, notice).await;
            return Ok(());
        }

        let summary = summarize(&hits);

        if !self.gemini.is_available() {
            self.send(
                platform,
                event.channel,
                &format!("Live search results:\n{}", summary),
            )
            .await;
            return Ok(());
        }

        let settings = self.settings.snapshot().await;
        let prompt = build_normal_prompt(
            &PromptInput {
                user_name: &event.author_name,
                text: &text,
                is_owner: self.config.is_owner(event.author),
                allow_insults: self.config.allow_insults,
                search_summary: Some(&summary),
            },
            &settings,
            self.config.language_strategy,
        );

        match self.gemini.generate(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => {
                self.send(platform, event.channel, &reply).await;
                self.remember_exchange(event.author, &text, &reply).await;
            }
            Ok(_) | Err(_) => {
                // generation fell over: the raw summary is still an answer
                self.send(
                    platform,
                    event.channel,
                    &format!("Live search results:\n{}", summary),
                )
                .await;
                self.remember_exchange(event.author, &text, &summary).await;
            }
        }
        Ok(())
    }

    /// Lyrics path: never asks the generator for lyrics; a capped excerpt
    /// from search results plus links keeps it on the right side of
    /// copyright.
    async fn compose_lyrics(
        &self,
        platform: &dyn ChatPlatform,
        event: &ChatEvent,
        song: &str,
    ) -> Result<()> {
        if !self.search.is_configured() {
            self.send(platform, event.channel, SEARCH_NOT_CONFIGURED).await;
            return Ok(());
        }

        let query = format!("{} lyrics", song);
        let hits = match self.search.search(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                error!("Lyrics search failed: {}", e);
                self.send(
                    platform,
                    event.channel,
                    &format!("Kuch error aa gaya Papa ji: `{}`", e),
                )
                .await;
                return Ok(());
            }
        };

        if hits.is_empty() {
            self.send(platform, event.channel, NO_SEARCH_RESULTS).await;
            return Ok(());
        }

        let summary = summarize(&hits);
        let excerpt = lyrics_excerpt(&summary);
        let links: Vec<&str> = hits
            .iter()
            .map(|h| h.link.as_str())
            .filter(|l| !l.is_empty())
            .collect();

        let mut reply = format!(
            "Papa ji — lyrics ka short snippet (copyright rules ke wajah se full lyrics nahi de sakta):\n\"{}\"\n\nFull lyrics ke liye search results:\n{}",
            excerpt, summary
        );
        if !links.is_empty() {
            reply.push('\n');
            reply.push_str(&links.join("\n"));
        }

        self.send(platform, event.channel, &reply).await;
        self.sessions
            .set(event.author, "lyrics", &event.clean_text, vec![song.to_string()])
            .await;
        Ok(())
    }

    /// Owner announcement, generated and posted to the target channel
    async fn compose_announcement(
        &self,
        platform: &dyn ChatPlatform,
        event: &ChatEvent,
        topic: &str,
    ) {
        if !self.gemini.is_available() {
            self.send(platform, event.channel, GEMINI_MISSING).await;
            return;
        }

        let target = event.target_channel();
        let prompt = build_announcement_prompt(
            &event.author_name,
            topic,
            self.config.is_owner(event.author),
        );

        let _ = platform.start_typing(target).await;
        match self.gemini.generate(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => {
                self.send(platform, target, &reply).await;
            }
            Ok(_) => self.send(platform, event.channel, BLANK_REPLY).await,
            Err(e) => {
                error!("Announcement generation failed: {}", e);
                self.send(
                    platform,
                    event.channel,
                    &format!("Kuch error aa gaya Papa ji: `{}`", e),
                )
                .await;
            }
        }
    }

    /// No generation backend: canned replies only
    async fn degraded_reply(
        &self,
        platform: &dyn ChatPlatform,
        event: &ChatEvent,
        text: &str,
    ) {
        if text.to_lowercase().contains("daru") {
            self.sessions
                .set(
                    event.author,
                    "daru",
                    text,
                    vec![
                        "Old Monk".to_string(),
                        "McDowell's No.1".to_string(),
                        "Magic Moments".to_string(),
                    ],
                )
                .await;
            self.send(
                platform,
                event.channel,
                "Papa ji, ₹500 ke budget me Old Monk, McDowell's No.1, Magic Moments jaise options mil jaate.",
            )
            .await;
            return;
        }
        self.send(platform, event.channel, GEMINI_MISSING).await;
    }

    /// Terminal `Sent` bookkeeping: harvest items from the reply and write
    /// session context when a subject tag was inferred.
    async fn remember_exchange(&self, author: u64, query: &str, reply: &str) {
        let subject = extract_subject(query);
        if subject.is_empty() {
            return;
        }
        let items = extract_items(reply, MAX_REPLY_ITEMS);
        self.sessions.set(author, subject, query, items).await;
    }

    /// Best-effort flush of settings plus the session snapshot
    pub async fn flush(&self) {
        self.settings.save().await;
        self.sessions.save().await;
    }
}

/// First non-empty summary line, snippet part only, capped at a word
/// boundary near 90 chars.
fn lyrics_excerpt(summary: &str) -> String {
    let first_line = summary
        .lines()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    let text = match first_line.split_once('—') {
        Some((_, rest)) => rest.trim(),
        None => first_line.trim_start_matches("• ").trim(),
    };

    if text.len() <= LYRICS_EXCERPT_LIMIT {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .take_while(|(i, _)| *i < LYRICS_EXCERPT_LIMIT - 3)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(text.len());
    let head = &text[..cut];
    let head = head.rsplit_once(' ').map(|(a, _)| a).unwrap_or(head);
    format!("{}...", head)
}
