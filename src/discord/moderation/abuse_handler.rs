// Discord-specific anti-abuse handling - translates threshold results into
// role removal, a DM to the moderator, and log channel reports.

use crate::core::abuse::{AbuseResolution, ModLogEvent};
use crate::discord::logging::formatter::format_role_removed_dm;
use crate::discord::logging::send_log;
use crate::discord::Data;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context};

const ROLE_REMOVAL_REASON: &str = "Auto anti-abuse: exceeded punishment threshold";

/// Count a punitive action for `moderator_id` and act if they went over the limit.
///
/// Never fails: anything that goes wrong is logged and dropped.
pub async fn handle_abuse(
    ctx: &Context,
    data: &Data,
    guild_id: serenity::GuildId,
    moderator_id: serenity::UserId,
) {
    if let Err(e) = check_moderator(ctx, data, guild_id, moderator_id).await {
        tracing::error!(
            guild_id = guild_id.get(),
            moderator_id = moderator_id.get(),
            "Anti-abuse handling failed: {}",
            e
        );
    }
}

async fn check_moderator(
    ctx: &Context,
    data: &Data,
    guild_id: serenity::GuildId,
    moderator_id: serenity::UserId,
) -> Result<()> {
    let check = data
        .abuse
        .record_action(guild_id.get(), moderator_id.get())
        .await?;

    let count = check.count();
    if !check.is_exceeded() {
        tracing::debug!(
            guild_id = guild_id.get(),
            moderator_id = moderator_id.get(),
            count,
            "Moderator action counted"
        );
        return Ok(());
    }

    tracing::warn!(
        guild_id = guild_id.get(),
        moderator_id = moderator_id.get(),
        count,
        "Moderator exceeded the action limit"
    );

    let guild_name = guild_name(ctx, guild_id);

    let member = match guild_id.member(ctx, moderator_id).await {
        Ok(member) => Some(member),
        Err(e) => {
            tracing::warn!("Could not fetch moderator {}: {}", moderator_id, e);
            None
        }
    };
    let has_role = member
        .as_ref()
        .is_some_and(|m| m.roles.contains(&data.admin_role_id));

    match (AbuseResolution::decide(member.is_some(), has_role), member) {
        (AbuseResolution::ReportOnly, Some(member)) => {
            send_log(
                ctx,
                data,
                ModLogEvent::ThresholdReached {
                    guild_name,
                    moderator_tag: member.user.tag(),
                    moderator_id: moderator_id.get(),
                    count,
                    threshold: data.abuse.threshold_summary(),
                },
            )
            .await;
        }
        (AbuseResolution::RemoveRole, Some(member)) => {
            remove_role(ctx, data, guild_id, &member, &guild_name).await;
        }
        _ => {
            send_log(
                ctx,
                data,
                ModLogEvent::MemberNotFound {
                    guild_name,
                    moderator_id: moderator_id.get(),
                },
            )
            .await;
        }
    }

    data.abuse.resolve(guild_id.get(), moderator_id.get()).await?;
    Ok(())
}

/// Take the monitored role away, tell the moderator and report it.
async fn remove_role(
    ctx: &Context,
    data: &Data,
    guild_id: serenity::GuildId,
    member: &serenity::Member,
    guild_name: &str,
) {
    let moderator_id = member.user.id;
    let moderator_tag = member.user.tag();

    if let Err(e) = ctx
        .http
        .remove_member_role(
            guild_id,
            moderator_id,
            data.admin_role_id,
            Some(ROLE_REMOVAL_REASON),
        )
        .await
    {
        tracing::error!("Failed removing role from {}: {}", moderator_id, e);
        send_log(
            ctx,
            data,
            ModLogEvent::RoleRemovalFailed {
                moderator_tag: moderator_tag.clone(),
                moderator_id: moderator_id.get(),
                error: e.to_string(),
            },
        )
        .await;
    } else {
        tracing::info!(
            guild_id = guild_id.get(),
            moderator_id = moderator_id.get(),
            "Removed monitored role from moderator"
        );
    }

    let dm = format_role_removed_dm(data.abuse.config(), guild_name);
    if let Err(e) = member
        .user
        .direct_message(ctx, serenity::CreateMessage::new().embed(dm))
        .await
    {
        tracing::warn!("Could not send DM to moderator {}: {}", moderator_id, e);
    }

    send_log(
        ctx,
        data,
        ModLogEvent::RoleRemoved {
            guild_name: guild_name.to_string(),
            moderator_tag,
            moderator_id: moderator_id.get(),
            threshold: data.abuse.threshold_summary(),
        },
    )
    .await;
}

/// Guild name from the cache, falling back to the raw ID.
pub fn guild_name(ctx: &Context, guild_id: serenity::GuildId) -> String {
    guild_id
        .name(&ctx.cache)
        .unwrap_or_else(|| format!("Guild {}", guild_id))
}
