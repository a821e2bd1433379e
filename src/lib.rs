//! Pappu Programmer
//!
//! Hinglish Discord bot backed by Gemini text generation with optional live
//! web search, natural-language owner admin commands, and short-lived
//! per-user conversation context for follow-up questions.
//!
//! # Architecture
//!
//! ```text
//! Discord gateway ──► ChatEvent ──► Router ──► Gemini API
//!    (serenity)                       │
//!                                     ├── Classifier (ordered keyword rules)
//!                                     ├── Settings (mode/locks, JSON persisted)
//!                                     ├── Sessions (per-user context, 6h TTL)
//!                                     └── Search (SerpAPI / Google CSE)
//! ```

pub mod channels;
pub mod config;
pub mod extract;
pub mod gemini;
pub mod intent;
pub mod prompt;
pub mod router;
pub mod search;
pub mod session;
pub mod settings;

pub use channels::{ChatEvent, ChatPlatform, Handler, SerenityPlatform};
pub use config::Config;
pub use gemini::GeminiClient;
pub use intent::{AdminCommand, Classifier, Intent};
pub use router::Router;
pub use search::{SearchClient, SearchHit};
pub use session::{SessionContext, SessionStore};
pub use settings::{Mode, Settings, SettingsStore};
