//! Reply mining helpers
//!
//! Tags a coarse subject from the incoming query and pulls short labeled
//! items out of generated replies so a later "which one?" can be resolved
//! against them.

use once_cell::sync::Lazy;
use regex::Regex;

/// Most items harvested from a single reply
pub const MAX_REPLY_ITEMS: usize = 8;

/// Items longer than this many words are noise, not labels
const MAX_ITEM_WORDS: usize = 6;

/// Hard cap on item length
const MAX_ITEM_CHARS: usize = 120;

static LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-\d\.\s]+").unwrap());
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());
static QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["'`]+"#).unwrap());

/// Coarse topic tag for session context. Empty string means "no subject",
/// which suppresses the context write.
pub fn extract_subject(text: &str) -> &'static str {
    let t = text.to_lowercase();
    if t.contains("daru") || t.contains("alcohol") || t.contains("drink") {
        "daru"
    } else if t.contains("phone") || t.contains("mobile") {
        "phone"
    } else if t.contains("laptop") {
        "laptop"
    } else if t.contains("movie") || t.contains("series") || t.contains("film") {
        "movie"
    } else {
        ""
    }
}

/// Pull up to `max` short candidate items from a generated reply.
///
/// Bulleted and numbered lines win; comma-separated runs are the fallback.
/// Items are deduplicated case-insensitively and kept only when they look
/// like labels (at most six words, 120 chars).
pub fn extract_items(text: &str, max: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut items: Vec<String> = Vec::new();

    for line in text.lines() {
        let s = line.trim();
        if s.starts_with('•') || s.starts_with('-') || NUMBERED.is_match(s) {
            let stripped = LIST_MARKER.replace(s, "").trim().to_string();
            // keep only the label before any dash-separated description
            let label = stripped.split('—').next().unwrap_or("").trim().to_string();
            if !label.is_empty() {
                items.push(label);
            }
        }
    }

    if items.is_empty() {
        for line in text.lines() {
            if line.contains(',') && line.len() < 200 {
                for part in line.split(',') {
                    let part = part.trim();
                    let words = part.split_whitespace().count();
                    if (1..=MAX_ITEM_WORDS).contains(&words) {
                        items.push(part.to_string());
                    }
                }
            }
        }
    }

    let mut cleaned: Vec<String> = Vec::new();
    for item in items {
        let item = QUOTES.replace_all(&item, "").trim().to_string();
        if item.is_empty() || item.len() > MAX_ITEM_CHARS {
            continue;
        }
        if item.split_whitespace().count() > MAX_ITEM_WORDS {
            continue;
        }
        if !cleaned.iter().any(|seen| seen.eq_ignore_ascii_case(&item)) {
            cleaned.push(item);
        }
        if cleaned.len() >= max {
            break;
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_tags() {
        assert_eq!(extract_subject("daru suggest karo"), "daru");
        assert_eq!(extract_subject("best MOBILE under 20k"), "phone");
        assert_eq!(extract_subject("koi movie batao"), "movie");
        assert_eq!(extract_subject("kya haal hai"), "");
    }

    #[test]
    fn test_items_from_bullets() {
        let reply = "Ye options dekho:\n• Old Monk — sasta aur classic\n- Magic Moments — vodka\n1. Blenders Pride";
        let items = extract_items(reply, MAX_REPLY_ITEMS);
        assert_eq!(items, vec!["Old Monk", "Magic Moments", "Blenders Pride"]);
    }

    #[test]
    fn test_items_comma_fallback() {
        let reply = "Old Monk, McDowell's No.1, Magic Moments jaise options hain";
        let items = extract_items(reply, MAX_REPLY_ITEMS);
        assert!(items.iter().any(|i| i == "Old Monk"));
        assert!(items.iter().any(|i| i == "McDowell's No.1"));
    }

    #[test]
    fn test_items_deduped_case_insensitive() {
        let reply = "• Old Monk\n• old monk\n• OLD MONK";
        let items = extract_items(reply, MAX_REPLY_ITEMS);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_items_capped() {
        let reply: String = (0..20).map(|i| format!("• Item {}\n", i)).collect();
        let items = extract_items(&reply, MAX_REPLY_ITEMS);
        assert_eq!(items.len(), MAX_REPLY_ITEMS);
    }

    #[test]
    fn test_long_lines_rejected() {
        let reply = "• this line has way too many words to count as a short labeled item";
        assert!(extract_items(reply, MAX_REPLY_ITEMS).is_empty());
    }
}
