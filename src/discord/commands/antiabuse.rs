// Anti-abuse slash commands - inspect and reset moderator counters.
//
// This layer is THIN: extract IDs, call the core service, format the reply.

use crate::core::abuse::ModLogEvent;
use crate::discord::logging::deliver_log;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Moderator anti-abuse commands.
#[poise::command(
    slash_command,
    subcommands("status", "reset", "testlog"),
    required_permissions = "MANAGE_ROLES",
    guild_only
)]
pub async fn antiabuse(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show the anti-abuse threshold and, optionally, a moderator's current count.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn status(
    ctx: Context<'_>,
    #[description = "Moderator to inspect"] moderator: Option<serenity::User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let data = ctx.data();
    let config = data.abuse.config();

    let mut embed = serenity::CreateEmbed::new()
        .title("🛡️ Anti-Abuse Status")
        .color(serenity::Colour::BLURPLE)
        .field(
            "Threshold",
            format!(
                "More than {} kicks/bans/timeouts in {} minutes",
                config.action_limit,
                config.window_minutes()
            ),
            false,
        )
        .field("Monitored Role", format!("<@&{}>", data.admin_role_id), true)
        .field("Log Channel", format!("<#{}>", data.log_channel_id), true);

    if let Some(user) = moderator {
        let count = data
            .abuse
            .current_count(guild_id.get(), user.id.get(), chrono::Utc::now())
            .await?;
        embed = embed.field(
            "Moderator",
            format!("<@{}>: {}/{} actions this window", user.id, count, config.action_limit),
            false,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Clear a moderator's action counter.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn reset(
    ctx: Context<'_>,
    #[description = "Moderator whose counter should be cleared"] moderator: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let existed = ctx
        .data()
        .abuse
        .reset(guild_id.get(), moderator.id.get())
        .await?;

    tracing::info!(
        guild_id = guild_id.get(),
        moderator_id = moderator.id.get(),
        reset_by = ctx.author().id.get(),
        "Anti-abuse counter reset"
    );

    if existed {
        ctx.say(format!("✅ Cleared the anti-abuse counter for <@{}>.", moderator.id))
            .await?;
    } else {
        ctx.say(format!("<@{}> has no recorded actions.", moderator.id))
            .await?;
    }
    Ok(())
}

/// Post a test message to the log channel.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn testlog(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();

    match deliver_log(ctx.serenity_context(), data, &ModLogEvent::TestMessage).await {
        Ok(()) => {
            ctx.say(format!("✅ Test message sent to <#{}>.", data.log_channel_id))
                .await?;
        }
        Err(e) => {
            tracing::error!("Log channel test failed: {}", e);
            ctx.say(format!(
                "❌ Could not post to <#{}>: {}",
                data.log_channel_id, e
            ))
            .await?;
        }
    }
    Ok(())
}
