use crate::core::abuse::{ModActionKind, ModLogEvent, ModerationAction};
use crate::discord::logging::send_log;
use crate::discord::moderation::abuse_handler::handle_abuse;
use crate::discord::moderation::audit_log::find_action;
use crate::discord::Data;
use anyhow::Result;
use poise::serenity_prelude::{self as serenity, Context};

/// Member left the guild - it was a kick if the audit log says so.
pub async fn handle_member_remove(
    ctx: &Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
) -> Result<()> {
    if let Some(action) = find_action(ctx, guild_id, ModActionKind::Kick, user).await {
        record_action(ctx, data, action).await;
    }
    Ok(())
}

pub async fn handle_ban_add(
    ctx: &Context,
    data: &Data,
    guild_id: serenity::GuildId,
    banned_user: &serenity::User,
) -> Result<()> {
    if let Some(action) = find_action(ctx, guild_id, ModActionKind::Ban, banned_user).await {
        record_action(ctx, data, action).await;
    }
    Ok(())
}

/// Member was updated - only newly applied timeouts are interesting.
pub async fn handle_member_update(
    ctx: &Context,
    data: &Data,
    old: Option<&serenity::Member>,
    event: &serenity::GuildMemberUpdateEvent,
) -> Result<()> {
    let old_timeout = old.map(|m| m.communication_disabled_until.as_ref());
    let new_timeout = event.communication_disabled_until.as_ref();

    if !timeout_newly_applied(old_timeout, new_timeout) {
        return Ok(());
    }

    if let Some(action) =
        find_action(ctx, event.guild_id, ModActionKind::Timeout, &event.user).await
    {
        record_action(ctx, data, action).await;
    }
    Ok(())
}

/// True when the member had no timeout before and has one now.
///
/// `old` is `None` when the member was not cached; without a previous state
/// nothing can be said to have changed.
pub fn timeout_newly_applied<T>(old: Option<Option<&T>>, new: Option<&T>) -> bool {
    matches!(old, Some(None)) && new.is_some()
}

/// Log the action, then count it against the moderator who performed it.
async fn record_action(ctx: &Context, data: &Data, action: ModerationAction) {
    tracing::info!(
        guild_id = action.guild_id,
        target_id = action.target_id,
        moderator_id = ?action.moderator_id,
        action = %action.kind,
        "Moderation action detected"
    );

    let guild_id = serenity::GuildId::new(action.guild_id);
    let moderator_id = action.moderator_id;
    send_log(ctx, data, ModLogEvent::ActionTaken(action)).await;

    let Some(moderator_id) = moderator_id else {
        return;
    };

    // The bot's own actions are reported but never counted
    if moderator_id == ctx.cache.current_user().id.get() {
        return;
    }

    handle_abuse(ctx, data, guild_id, serenity::UserId::new(moderator_id)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_newly_applied() {
        assert!(timeout_newly_applied(Some(None), Some(&1)));
    }

    #[test]
    fn test_timeout_extended_or_cleared_is_ignored() {
        assert!(!timeout_newly_applied(Some(Some(&1)), Some(&2)));
        assert!(!timeout_newly_applied(Some(Some(&1)), None));
        assert!(!timeout_newly_applied::<i64>(Some(None), None));
    }

    #[test]
    fn test_uncached_member_is_ignored() {
        // A nickname edit on an uncached member who is already timed out
        assert!(!timeout_newly_applied(None, Some(&1)));
        assert!(!timeout_newly_applied::<i64>(None, None));
    }
}
