//! Pappu Programmer - Entry Point
//!
//! Composition root: loads configuration, restores persisted state, wires
//! the router, and runs the Discord gateway until a shutdown signal or an
//! owner shutdown/restart command arrives.

use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tokio::sync::Notify;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pappubot::channels::Handler;
use pappubot::config::Config;
use pappubot::gemini::GeminiClient;
use pappubot::router::Router;
use pappubot::search::SearchClient;
use pappubot::session::SessionStore;
use pappubot::settings::SettingsStore;

/// Periodic persistence interval (crash-safety net on top of
/// save-on-mutation)
const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pappubot=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("Starting Pappu Programmer");
    if config.owner_id == 0 {
        warn!("OWNER_ID not set: admin commands are disabled");
    }
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set: replies degrade to canned responses");
    }
    if !config.search.is_configured() {
        info!("No search provider configured: live-info requests disabled");
    }

    let settings = Arc::new(SettingsStore::load(
        &config.settings_path,
        config.allow_profanity,
    ));
    let sessions = Arc::new(SessionStore::load(&config.memory_path));
    let gemini = GeminiClient::new(config.gemini_api_key.as_deref(), &config.gemini_model);
    let search = SearchClient::new(config.search.clone());
    let shutdown = Arc::new(Notify::new());

    let discord_token = config.discord_token.clone();
    let router = Arc::new(Router::new(
        config,
        settings.clone(),
        sessions.clone(),
        gemini,
        search,
        shutdown.clone(),
    ));

    // Crash-safety flush regardless of the dirty flag
    {
        let settings = settings.clone();
        let sessions = sessions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(AUTOSAVE_INTERVAL);
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                settings.save().await;
                sessions.save().await;
            }
        });
    }

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS;

    let mut client = Client::builder(&discord_token, intents)
        .event_handler(Handler::new(router.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    // Graceful shutdown on SIGTERM/Ctrl+C or an owner shutdown command:
    // flush state, then stop all shards.
    let shard_manager = client.shard_manager.clone();
    {
        let router = router.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = match signal(SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(e) => {
                        error!("Failed to install SIGTERM handler: {}", e);
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                    _ = shutdown.notified() => {}
                }
            }
            #[cfg(not(unix))]
            {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = shutdown.notified() => {}
                }
            }

            info!("Shutdown requested, flushing state...");
            router.flush().await;
            shard_manager.shutdown_all().await;
        });
    }

    info!("Starting Discord gateway connection...");
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    // Final flush after the gateway stops
    settings.save().await;
    sessions.save().await;
    info!("Pappu Programmer stopped");
    Ok(())
}
