// This is the entry point of the anti-abuse bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (in-memory storage)
// - `discord/` = Discord-specific adapters (commands, events, log output)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::BotConfig;
use crate::core::abuse::AbuseService;
use crate::discord::commands::presence;
use crate::discord::moderation::events as moderation_events;
use crate::discord::{Data, Error};
use crate::infra::abuse::InMemoryAbuseStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        // Kick: the member is gone, the audit log says whether it was a kick
        serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            if let Err(e) =
                moderation_events::handle_member_remove(ctx, data, *guild_id, user).await
            {
                tracing::error!("GuildMemberRemoval handler error: {}", e);
            }
        }
        serenity::FullEvent::GuildBanAddition {
            guild_id,
            banned_user,
        } => {
            if let Err(e) =
                moderation_events::handle_ban_add(ctx, data, *guild_id, banned_user).await
            {
                tracing::error!("GuildBanAddition handler error: {}", e);
            }
        }
        // Timeout: communication_disabled_until newly set
        serenity::FullEvent::GuildMemberUpdate {
            old_if_available,
            event,
            ..
        } => {
            if let Err(e) = moderation_events::handle_member_update(
                ctx,
                data,
                old_if_available.as_ref(),
                event,
            )
            .await
            {
                tracing::error!("GuildMemberUpdate handler error: {}", e);
            }
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

    let config = BotConfig::from_env().unwrap_or_else(|e| {
        tracing::error!("[FATAL] {}. Set it in the environment or a .env file.", e);
        std::process::exit(1);
    });

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let abuse_service = Arc::new(AbuseService::new(
        InMemoryAbuseStore::new(),
        config.abuse.clone(),
    ));

    tracing::info!(
        log_channel_id = config.log_channel_id,
        admin_role_id = config.admin_role_id,
        threshold = %abuse_service.threshold_summary(),
        "Anti-abuse configured"
    );

    let data = Data {
        abuse: Arc::clone(&abuse_service),
        log_channel_id: serenity::ChannelId::new(config.log_channel_id),
        admin_role_id: serenity::RoleId::new(config.admin_role_id),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS // Member remove/update events
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MODERATION; // Ban events + audit log access

    let post_test_log = config.log_test_on_ready;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::antiabuse::antiabuse()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered");

                presence::on_ready(ctx, ready, &data, post_test_log).await;

                // Forget counters whose window has run out, once per window
                let abuse = Arc::clone(&data.abuse);
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(abuse.config().window);
                    interval.tick().await;

                    loop {
                        interval.tick().await;
                        match abuse.prune_expired(chrono::Utc::now()).await {
                            Ok(0) => tracing::debug!("No expired anti-abuse counters"),
                            Ok(removed) => {
                                tracing::info!("Pruned {} expired anti-abuse counters", removed)
                            }
                            Err(e) => tracing::warn!("Anti-abuse prune failed: {}", e),
                        }
                    }
                });

                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
        .expect("Error creating client");

    if let Err(e) = client.start().await {
        tracing::error!("Failed to login: {}", e);
        std::process::exit(1);
    }
}
