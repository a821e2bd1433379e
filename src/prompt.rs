//! Prompt Assembly
//!
//! Persona preamble, per-mode tone descriptors, the reply-language policy,
//! roast template pools, and the builders that assemble outbound generation
//! requests from all of the above.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;

use crate::settings::{Mode, Settings};

/// Fixed persona/style preamble injected into every generation request
pub const PERSONALITY: &str = "\
You are Pappu Programmer, a smart, funny Discord bot.

Language & Style:
- Reply in Hinglish (Hindi + English mix) by default.
- Tone: friendly, witty. OWNER-only modes may allow stronger profanity.
- Avoid hateful slurs targeting protected groups.
- If the user is the owner, call them \"Papa ji\".
- Default: short / medium replies (2-4 lines). Use longer only on explicit requests.

Knowledge:
- Explain general topics. Live web search only if a search provider is configured.
- Always answer only the latest message; prefer short direct replies.
";

/// Safe roast pool, also used as the polite deflection when profanity is off
pub static SAFE_ROAST_POOL: &[&str] = &[
    "Arre {name}, thoda soft reh — tera logic abhi beta mode me hai. 😏",
    "{name}, tera swag strong hai par andar se 404 common sense mil raha hai. 😂",
    "Bhai {name}, pehle unit tests pass kar, phir hero ban. 😅",
    "{name}, chup reh ke bhi banda classy lag sakta hai — try kar.",
];

/// Profane pool, gated on the allow_profanity setting
pub static PROFANE_ROAST_POOL: &[&str] = &[
    "{name}, asli baat: tera dimag chain se so nahi paata; waha logic nahi milta. 😆",
    "{name}, tu itna bakwaas kar raha hai ki mera buffer overflow ho raha hai. Chill!",
    "{name}, thoda chup kar. Teri comedy paid subscription wali ho gayi hai — mujhe block karne ka man kar raha.",
];

static DETAIL_KEYWORDS: &[&str] = &[
    "detail", "details", "samjha", "samjhao", "explain", "theory", "history",
    "kaise", "kya hota", "physics", "science",
];

static DEVANAGARI: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{0900}-\u{097F}]").unwrap());
static ASCII_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z']+").unwrap());

/// Reply language for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Hinglish,
}

/// Policy for picking the reply language when english_lock is off.
///
/// Earlier bot revisions auto-detected English from the incoming text;
/// later ones always answered in Hinglish unless locked. Both behaviors
/// are kept selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageStrategy {
    /// Heuristic text detection per message
    AutoDetect,
    /// Always Hinglish unless english_lock forces English
    HinglishDefault,
}

/// Resolve the reply language. english_lock always wins.
pub fn resolve_language(settings: &Settings, strategy: LanguageStrategy, text: &str) -> Language {
    if settings.english_lock {
        return Language::English;
    }
    match strategy {
        LanguageStrategy::AutoDetect if is_english(text) => Language::English,
        _ => Language::Hinglish,
    }
}

/// Strict English detection so the bot does not get stuck replying in
/// English to mixed Hinglish messages. Devanagari anywhere means Hinglish;
/// otherwise the message needs at least two longish ASCII words and a high
/// token ratio.
pub fn is_english(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if DEVANAGARI.is_match(text) {
        return false;
    }

    let words: Vec<&str> = ASCII_WORD.find_iter(text).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return false;
    }

    let long_words = words.iter().filter(|w| w.len() >= 4).count();
    if long_words < 2 {
        return false;
    }

    let token_count = text.split_whitespace().count().max(1);
    words.len() as f64 / token_count as f64 >= 0.70
}

/// Tone descriptor injected next to the active mode
pub fn tone_descriptor(mode: Mode) -> &'static str {
    match mode {
        Mode::Funny => "masti + light roast, friendly",
        Mode::Angry => "thoda aggressive, short, savage",
        Mode::Serious => "calm, formal, informative",
        Mode::Flirty => "playful, light flirting (no sexual content)",
        Mode::Sarcastic => "sarcastic, witty",
        Mode::Bhaukaal => "mafia-style, confident, short",
        Mode::Kid => "simple, kid-friendly, no profanity",
        Mode::Toxic => "very savage (OWNER-ONLY RECOMMENDED)",
        Mode::Coder => "technical, precise, code-friendly",
        Mode::BhaiJi => "respectful, elder-bhai tone",
        Mode::Dark => "mysterious, philosophical",
    }
}

/// Longer answers only for clearly detail-seeking questions
pub fn is_detailed_question(text: &str) -> bool {
    let t = text.to_lowercase();
    DETAIL_KEYWORDS.iter().any(|k| t.contains(k))
}

/// Pick a roast for `target_name`. The profane pool needs both the request
/// and the setting to allow it.
pub fn choose_roast(target_name: &str, profane: bool) -> String {
    let pool = if profane {
        PROFANE_ROAST_POOL
    } else {
        SAFE_ROAST_POOL
    };
    let template = pool
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(SAFE_ROAST_POOL[0]);
    template.replace("{name}", target_name)
}

/// Inputs for the normal chat prompt
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub user_name: &'a str,
    pub text: &'a str,
    pub is_owner: bool,
    pub allow_insults: bool,
    pub search_summary: Option<&'a str>,
}

/// Assemble the outbound generation request: persona, tone descriptor,
/// policy lines, the (possibly expanded) query, and optional search
/// grounding.
pub fn build_normal_prompt(
    input: &PromptInput<'_>,
    settings: &Settings,
    strategy: LanguageStrategy,
) -> String {
    let title_name = if input.is_owner { "Papa ji" } else { input.user_name };

    let length_line = if is_detailed_question(input.text) {
        "Answer thoda detailed de sakte ho (max ~10-12 lines)."
    } else {
        "Answer chhota / medium rakho (max 2-4 lines, seedha point pe)."
    };

    let insults_note = if input.allow_insults {
        "Allowed to use light roasts."
    } else {
        "Do NOT use abusive slurs. Keep witty but safe."
    };

    let profanity_note = if settings.allow_profanity {
        "Strong profanity allowed (owner-controlled)."
    } else {
        "Strong profanity disabled."
    };

    let lang_hint = match resolve_language(settings, strategy, input.text) {
        Language::English => "Reply ONLY in English.",
        Language::Hinglish => "Reply in Hinglish (Hindi+English).",
    };

    let mut prompt = format!(
        "{PERSONALITY}\nMode: {} — Tone: {}\n{} {}\n{}\n\nUser ({}) ne pucha:\n\"\"\"{}\"\"\"\n\n{}\n",
        settings.mode.as_str(),
        tone_descriptor(settings.mode),
        insults_note,
        profanity_note,
        lang_hint,
        title_name,
        input.text,
        length_line,
    );

    if let Some(summary) = input.search_summary.filter(|s| !s.is_empty()) {
        prompt.push_str(&format!(
            "\nHere are live search results to help answer:\n{summary}\n\nUse them to form a concise reply.\n"
        ));
    }

    prompt.push_str("\nAb Pappu Programmer ka reply (use the tone & language above):\n");
    prompt
}

/// Server-announcement request: bold title, a few bullets, bounded length
pub fn build_announcement_prompt(user_name: &str, topic: &str, is_owner: bool) -> String {
    let title_name = if is_owner { "Papa ji" } else { user_name };
    format!(
        "{PERSONALITY}\n\nYou are now writing a Discord SERVER ANNOUNCEMENT.\n\n\
         Requested by: {title_name}\nTopic: {topic}\n\n\
         Write an announcement in Hinglish with:\n\
         - A bold title line\n\
         - 3-6 short bullet points\n\
         - Friendly but clear tone\n\
         - 2-3 emojis max\n\
         - Overall length under 1800 characters.\n\n\
         Return ONLY the announcement text that can be directly pasted into Discord.\n"
    )
}
