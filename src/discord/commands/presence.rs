// This module handles bot presence and lifecycle events.
//
// Discord-layer glue only: we work with Discord SDK types (Context,
// ActivityData, OnlineStatus) and keep the logic short.

use crate::core::abuse::ModLogEvent;
use crate::discord::logging::deliver_log;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Shows what the bot is doing in the member list.
pub fn set_watching_status(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::watching("moderator actions");
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}

/// Called once the bot is ready so presence and the optional log channel check
/// live in one place.
pub async fn on_ready(
    ctx: &serenity::Context,
    ready: &serenity::Ready,
    data: &Data,
    post_test_log: bool,
) {
    tracing::info!("{} is online!", ready.user.tag());
    set_watching_status(ctx);

    if post_test_log {
        match deliver_log(ctx, data, &ModLogEvent::TestMessage).await {
            Ok(()) => tracing::info!("Test message sent to the log channel"),
            Err(e) => tracing::error!("Error sending test message: {}", e),
        }
    }
}
