//! Intent Classification
//!
//! Pure keyword/pattern classification of an incoming cleaned message into
//! one of a small set of mutually exclusive categories. Rules are evaluated
//! strictly in precedence order and the first match wins:
//!
//! 1. Admin command (owner only)
//! 2. Insult directed at the assistant
//! 3. Short follow-up against live session context
//! 4. Lyrics request
//! 5. Live-information request
//! 6. Normal chat
//!
//! No rule here touches stores or adapters; the router owns side effects.

use once_cell::sync::Lazy;
use regex::Regex;

/// Message categories, in precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Admin(AdminCommand),
    Insult,
    Greeting,
    FollowUp,
    Lyrics { song: String },
    LiveInfo,
    Chat,
}

/// Owner admin command families. Targets (tagged users/channels) are
/// resolved by the router from the event, not parsed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Shutdown,
    Restart,
    /// None = malformed toggle, reply with usage
    OwnerDmOnly(Option<bool>),
    Stealth(Option<bool>),
    Mode(Option<String>),
    EnglishLock(Option<bool>),
    AllowProfanity(Option<bool>),
    DeleteLast,
    Announcement(String),
    Unmute,
    Mute,
    Kick,
    Ban,
    Unban,
    Roast,
}

/// Everything the classifier needs to know about one message
#[derive(Debug, Clone)]
pub struct ClassifyInput<'a> {
    /// Cleaned text: bot mention tokens stripped, trimmed
    pub text: &'a str,
    pub is_owner: bool,
    pub in_guild: bool,
    pub is_reply_to_bot: bool,
    pub wake_word_present: bool,
    /// A human other than the author is tagged
    pub has_other_tagged: bool,
    /// A non-expired session context exists for the author
    pub has_context: bool,
    pub search_configured: bool,
}

/// Follow-ups are only considered this short
const FOLLOWUP_MAX_WORDS: usize = 5;

static FOLLOWUP_CUES: &[&str] = &[
    "naam", "name", "bta naam", "bata naam", "bol naam", "uska naam",
    "isko naam", "inme se", "inme se kaun", "which",
];

static LIVE_TRIGGERS: &[&str] = &[
    "aaj", "kab", "news", "release", "date", "search", "khabar",
    "announce", "kab aayega", "kab aa rahi",
];

static PROFANITY_MARKERS: &[&str] = &[
    "chutiya", "ch*tiya", "gandu", "g**du", "saala", "saale", "bsdk", "b sdk",
    "mc", "m*c", "madarchod", "m*darchod", "bhosdike", "bhosdi", "tatti",
    "harami", "b*stard", "idiot", "stupid", "dumb", "loser",
];

static GALI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(gali|gali de|gali dega|gaali)\b").unwrap());

static SHOUTING_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!]{3,}").unwrap());

static LYRICS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"lyrics (?:of|for)\s+['"]?([^'"]{2,200})"#).unwrap());

static CHANNEL_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"<#\d+>").unwrap());

/// Ordered-rule classifier. Holds only the configured wake word.
pub struct Classifier {
    wake_word: String,
}

impl Classifier {
    pub fn new(wake_word: &str) -> Self {
        Self {
            wake_word: wake_word.to_lowercase(),
        }
    }

    /// Classify one message. First matching category wins.
    pub fn classify(&self, input: &ClassifyInput) -> Intent {
        if input.is_owner {
            if let Some(cmd) = self.parse_admin(input.text, input.in_guild) {
                return Intent::Admin(cmd);
            }
        }

        if !input.is_owner
            && contains_insult(input.text)
            && (input.is_reply_to_bot || (input.wake_word_present && !input.has_other_tagged))
        {
            return Intent::Insult;
        }

        if self.is_bare_wake(input.text) {
            return Intent::Greeting;
        }

        if input.has_context && is_short_followup(input.text) {
            return Intent::FollowUp;
        }

        if let Some(song) = lyrics_request(input.text) {
            return Intent::Lyrics { song };
        }

        if input.search_configured && wants_live_info(input.text) {
            return Intent::LiveInfo;
        }

        Intent::Chat
    }

    /// A bare wake word (or nothing after mention stripping) gets a canned
    /// greeting instead of a generation call.
    fn is_bare_wake(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        let t = t.trim();
        t.is_empty()
            || t == self.wake_word
            || t == format!("{}?", self.wake_word)
            || t == format!("{}!", self.wake_word)
            || t == format!("{} bot", self.wake_word)
    }

    /// Parse owner admin phrases. Settings-family phrases must start with
    /// the wake word; member-management and channel phrases are keyword
    /// matches and only apply inside a guild.
    pub fn parse_admin(&self, text: &str, in_guild: bool) -> Option<AdminCommand> {
        let t = text.to_lowercase();
        let t = t.trim();
        let wake = self.wake_word.as_str();

        if t == format!("{wake} shutdown") || t == format!("{wake} stop") || t == format!("{wake} sleep") {
            return Some(AdminCommand::Shutdown);
        }
        if t == format!("{wake} restart") || t == format!("{wake} reboot") {
            return Some(AdminCommand::Restart);
        }
        if t.starts_with(&format!("{wake} owner_dm")) {
            return Some(AdminCommand::OwnerDmOnly(parse_on_off(t)));
        }
        if t.starts_with(&format!("{wake} stealth")) {
            return Some(AdminCommand::Stealth(parse_on_off(t)));
        }
        if t.starts_with(&format!("{wake} mode")) {
            let candidate = t.split_whitespace().nth(2).map(|s| s.to_string());
            return Some(AdminCommand::Mode(candidate));
        }
        if t.starts_with(&format!("{wake} english")) {
            return Some(AdminCommand::EnglishLock(parse_on_off(t)));
        }
        if t.contains("allow_profanity") {
            return Some(AdminCommand::AllowProfanity(parse_on_off(t)));
        }

        if !in_guild {
            return None;
        }

        let has_any = |words: &[&str]| words.iter().any(|w| t.contains(w));

        if has_any(&["delete", "del", "uda", "hata", "remove"])
            && has_any(&["last", "pichla", "pichle"])
        {
            return Some(AdminCommand::DeleteLast);
        }

        if t.contains("announcement") || t.contains("announce") {
            let mut topic = text.to_string();
            for word in ["announcement", "announce"] {
                topic = topic.replace(word, "");
            }
            let topic = CHANNEL_MENTION.replace_all(&topic, "").trim().to_string();
            return Some(AdminCommand::Announcement(topic));
        }

        if t.contains("unmute") || (t.contains("mute") && t.contains("remove")) {
            return Some(AdminCommand::Unmute);
        }
        if t.contains("mute") {
            return Some(AdminCommand::Mute);
        }
        if t.contains("kick") || t.contains("bahar nikal") {
            return Some(AdminCommand::Kick);
        }
        if t.contains("ban") && !t.contains("unban") {
            return Some(AdminCommand::Ban);
        }
        if t.contains("unban") {
            return Some(AdminCommand::Unban);
        }
        if t.contains("gali de") || t.contains("insult") || t.contains("gali bhej") {
            return Some(AdminCommand::Roast);
        }

        None
    }
}

/// Profanity / hostility markers, the `gali` word family, and shouting runs
pub fn contains_insult(text: &str) -> bool {
    let t = text.to_lowercase();
    if PROFANITY_MARKERS.iter().any(|m| t.contains(m)) {
        return true;
    }
    GALI_PATTERN.is_match(&t) || SHOUTING_PATTERN.is_match(&t)
}

/// Word count small enough and a follow-up cue present
pub fn is_short_followup(text: &str) -> bool {
    if text.split_whitespace().count() > FOLLOWUP_MAX_WORDS {
        return false;
    }
    let t = text.to_lowercase();
    FOLLOWUP_CUES.iter().any(|cue| t.contains(cue))
}

/// Extract the song phrase from a lyrics request: a quoted/plain phrase
/// after "of"/"for", else the 1-5 words right after "lyrics".
pub fn lyrics_request(text: &str) -> Option<String> {
    let t = text.to_lowercase();
    if !(t.contains("lyrics") || t.contains("gaane ke")) {
        return None;
    }

    if let Some(caps) = LYRICS_PATTERN.captures(&t) {
        let song = caps.get(1)?.as_str().trim().to_string();
        if !song.is_empty() {
            return Some(song);
        }
    }

    let parts: Vec<&str> = t.split_whitespace().collect();
    if let Some(idx) = parts.iter().position(|w| *w == "lyrics") {
        let end = (idx + 6).min(parts.len());
        let guess = parts[idx + 1..end].join(" ").trim().to_string();
        if !guess.is_empty() {
            return Some(guess);
        }
    }

    None
}

/// Recency/news/price cue words that suggest a live search is needed
pub fn wants_live_info(text: &str) -> bool {
    let t = text.to_lowercase();
    LIVE_TRIGGERS.iter().any(|w| t.contains(w))
}

fn parse_on_off(text: &str) -> Option<bool> {
    if text.contains("on") {
        Some(true)
    } else if text.contains("off") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new("pappu")
    }

    fn chat_input(text: &str) -> ClassifyInput<'_> {
        ClassifyInput {
            text,
            is_owner: false,
            in_guild: true,
            is_reply_to_bot: false,
            wake_word_present: true,
            has_other_tagged: false,
            has_context: false,
            search_configured: true,
        }
    }

    #[test]
    fn test_admin_shutdown_and_restart() {
        let c = classifier();
        assert_eq!(c.parse_admin("pappu shutdown", true), Some(AdminCommand::Shutdown));
        assert_eq!(c.parse_admin("pappu sleep", false), Some(AdminCommand::Shutdown));
        assert_eq!(c.parse_admin("pappu reboot", true), Some(AdminCommand::Restart));
    }

    #[test]
    fn test_admin_toggles() {
        let c = classifier();
        assert_eq!(
            c.parse_admin("pappu owner_dm on", true),
            Some(AdminCommand::OwnerDmOnly(Some(true)))
        );
        assert_eq!(
            c.parse_admin("pappu english off", false),
            Some(AdminCommand::EnglishLock(Some(false)))
        );
        assert_eq!(
            c.parse_admin("pappu stealth", true),
            Some(AdminCommand::Stealth(None))
        );
        assert_eq!(
            c.parse_admin("pappu mode bhaukaal", true),
            Some(AdminCommand::Mode(Some("bhaukaal".to_string())))
        );
        assert_eq!(c.parse_admin("pappu mode", true), Some(AdminCommand::Mode(None)));
    }

    #[test]
    fn test_member_commands_guild_only() {
        let c = classifier();
        assert_eq!(c.parse_admin("pappu mute him", true), Some(AdminCommand::Mute));
        assert_eq!(c.parse_admin("pappu mute him", false), None);
        assert_eq!(
            c.parse_admin("remove mute from him", true),
            Some(AdminCommand::Unmute)
        );
        assert_eq!(c.parse_admin("pappu kick him", true), Some(AdminCommand::Kick));
        assert_eq!(c.parse_admin("pappu ban this guy", true), Some(AdminCommand::Ban));
        assert_eq!(c.parse_admin("pappu unban 1234", true), Some(AdminCommand::Unban));
    }

    #[test]
    fn test_delete_last_phrases() {
        let c = classifier();
        assert_eq!(
            c.parse_admin("pappu delete last message", true),
            Some(AdminCommand::DeleteLast)
        );
        assert_eq!(
            c.parse_admin("pichla message hata do", true),
            Some(AdminCommand::DeleteLast)
        );
    }

    #[test]
    fn test_announcement_topic_extraction() {
        let c = classifier();
        match c.parse_admin("announcement <#123> game night friday", true) {
            Some(AdminCommand::Announcement(topic)) => {
                assert_eq!(topic, "game night friday");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_admin_wins_over_followup_cue() {
        let c = classifier();
        // owner phrase containing a follow-up cue word still routes as admin
        let input = ClassifyInput {
            is_owner: true,
            has_context: true,
            ..chat_input("pappu mode funny")
        };
        assert!(matches!(c.classify(&input), Intent::Admin(_)));
    }

    #[test]
    fn test_insult_requires_scope() {
        let c = classifier();

        let directed = chat_input("pappu tu idiot hai");
        assert_eq!(c.classify(&directed), Intent::Insult);

        // two humans fighting, bot only named: not our fight
        let bystander = ClassifyInput {
            has_other_tagged: true,
            ..chat_input("pappu dekh ye idiot kya bol raha")
        };
        assert_ne!(c.classify(&bystander), Intent::Insult);

        // reply to the bot's own message needs no wake word
        let reply = ClassifyInput {
            wake_word_present: false,
            is_reply_to_bot: true,
            ..chat_input("stupid bot")
        };
        assert_eq!(c.classify(&reply), Intent::Insult);
    }

    #[test]
    fn test_owner_never_classified_as_insulter() {
        let c = classifier();
        let input = ClassifyInput {
            is_owner: true,
            ..chat_input("tu idiot hai")
        };
        assert_ne!(c.classify(&input), Intent::Insult);
    }

    #[test]
    fn test_greeting_on_bare_wake() {
        let c = classifier();
        assert_eq!(c.classify(&chat_input("pappu")), Intent::Greeting);
        assert_eq!(c.classify(&chat_input("")), Intent::Greeting);
        assert_eq!(c.classify(&chat_input("pappu?")), Intent::Greeting);
    }

    #[test]
    fn test_followup_needs_context() {
        let c = classifier();

        let with_ctx = ClassifyInput {
            has_context: true,
            ..chat_input("inme se kaun")
        };
        assert_eq!(c.classify(&with_ctx), Intent::FollowUp);

        let without_ctx = chat_input("inme se kaun");
        assert_ne!(c.classify(&without_ctx), Intent::FollowUp);

        let too_long = ClassifyInput {
            has_context: true,
            ..chat_input("achha to phir inme se kaun sa wala best rahega bhai")
        };
        assert_ne!(c.classify(&too_long), Intent::FollowUp);
    }

    #[test]
    fn test_lyrics_extraction() {
        assert_eq!(lyrics_request("lyrics of Tum Hi Ho"), Some("tum hi ho".to_string()));
        assert_eq!(
            lyrics_request("bhej de lyrics for 'Kesariya' please"),
            Some("kesariya".to_string())
        );
        assert_eq!(lyrics_request("lyrics Tum Hi Ho"), Some("tum hi ho".to_string()));
        assert_eq!(lyrics_request("gaana bhejo"), None);
    }

    #[test]
    fn test_live_info_needs_search_backend() {
        let c = classifier();
        assert_eq!(c.classify(&chat_input("aaj ki news kya hai")), Intent::LiveInfo);

        let unconfigured = ClassifyInput {
            search_configured: false,
            ..chat_input("aaj ki news kya hai")
        };
        assert_eq!(c.classify(&unconfigured), Intent::Chat);
    }

    #[test]
    fn test_lyrics_wins_over_live_info() {
        let c = classifier();
        // "release date of song X lyrics" style messages hit lyrics first
        let input = chat_input("lyrics of Kesariya release date");
        assert!(matches!(c.classify(&input), Intent::Lyrics { .. }));
    }

    #[test]
    fn test_default_is_chat() {
        let c = classifier();
        assert_eq!(c.classify(&chat_input("kya haal hai bhai")), Intent::Chat);
    }
}
