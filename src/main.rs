// This is the entry point of the moderation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Config loading
// - `discord/` = Discord-specific adapters (commands, events, actuator)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a handful of mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::automod::{AutoModService, MonotonicClock};
use crate::discord::moderation::actuator::SerenityActuator;
use crate::discord::moderation::{automod_handler, commands};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use std::path::Path;
use std::sync::Arc;

/// Event handler for non-command Discord events.
/// Every inbound guild message goes through the automod pipeline.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) =
                automod_handler::handle_message_for_automod(ctx, new_message, data).await
            {
                tracing::error!("Error running automod on message: {}", e);
            }
        }
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!("Connected as {}", data_about_bot.user.name);
        }
        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let token = std::env::var("DISCORD_TOKEN").expect(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "data/config.json".to_string());
    let config = Arc::new(infra::config::load_or_default(Path::new(&config_path)));
    tracing::info!(
        path = config_path.as_str(),
        spam_threshold = config.spam_threshold,
        spam_interval_secs = config.spam_interval_secs,
        filter_words = config.word_filter.len(),
        "Loaded automod config"
    );

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::automod(),
                commands::kick(),
                commands::ban(),
                commands::mute(),
                commands::purge(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                // Register slash commands globally (can take up to an hour
                // to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Slash commands registered");

                // The actuator needs the gateway's HTTP client, so the
                // service is wired here rather than before the framework.
                let actuator = SerenityActuator::new(ctx.http.clone());
                Ok(Data {
                    automod: Arc::new(AutoModService::new(actuator)),
                    config,
                    clock: MonotonicClock::new(),
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    client.start().await.expect("Error running bot");
}
