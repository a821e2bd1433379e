//! Chat Platform Layer
//!
//! The router talks to Discord only through the narrow `ChatPlatform`
//! boundary defined here; serenity stays contained in the implementation
//! module.

pub mod discord;
pub mod traits;

pub use discord::{Handler, SerenityPlatform};
pub use traits::{
    chunk_message, BanEntry, ChannelError, ChatEvent, ChatPlatform, HistoryMessage, TaggedUser,
    CHUNK_DELAY_MS, MAX_MESSAGE_LEN,
};
