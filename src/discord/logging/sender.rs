use crate::core::abuse::ModLogEvent;
use crate::discord::logging::formatter::format_log_event;
use crate::discord::Data;
use poise::serenity_prelude::{self as serenity, Context};

/// Post an event to the log channel, returning any Discord error.
pub async fn deliver_log(
    ctx: &Context,
    data: &Data,
    event: &ModLogEvent,
) -> Result<(), serenity::Error> {
    let embed = format_log_event(event);
    data.log_channel_id
        .send_message(ctx, serenity::CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

/// Post an event to the log channel. Failures are logged and otherwise ignored.
pub async fn send_log(ctx: &Context, data: &Data, event: ModLogEvent) {
    if let Err(e) = deliver_log(ctx, data, &event).await {
        tracing::warn!(
            channel_id = data.log_channel_id.get(),
            "Failed to send log embed: {}",
            e
        );
    }
}
