// Audit log lookups - work out who performed a kick, ban or timeout.
//
// Gateway events only say *what* happened to a member. The executor and reason
// live in the audit log, so each event is paired with the newest entry of the
// matching type.

use crate::core::abuse::{ModActionKind, ModerationAction};
use poise::serenity_prelude::{self as serenity, Context};
use ::serenity::model::guild::audit_log::{Action, MemberAction};

fn audit_action(kind: ModActionKind) -> Action {
    match kind {
        ModActionKind::Kick => Action::Member(MemberAction::Kick),
        ModActionKind::Ban => Action::Member(MemberAction::BanAdd),
        ModActionKind::Timeout => Action::Member(MemberAction::Update),
    }
}

/// Find the audit log entry behind an action on `target`.
///
/// Returns `None` when the audit log can't be read, is empty, or its newest entry
/// is about somebody else.
pub async fn find_action(
    ctx: &Context,
    guild_id: serenity::GuildId,
    kind: ModActionKind,
    target: &serenity::User,
) -> Option<ModerationAction> {
    let logs = match guild_id
        .audit_logs(&ctx.http, Some(audit_action(kind)), None, None, Some(1))
        .await
    {
        Ok(logs) => logs,
        Err(e) => {
            tracing::warn!(
                guild_id = guild_id.get(),
                action = %kind,
                "Failed to fetch audit logs: {}",
                e
            );
            return None;
        }
    };

    let entry = logs.entries.into_iter().next()?;

    // Make sure this entry is about the member from the event
    let target_id = entry.target_id.map(|id| id.get());
    if target_id != Some(target.id.get()) {
        tracing::debug!(
            guild_id = guild_id.get(),
            action = %kind,
            "Latest audit log entry does not match the affected member"
        );
        return None;
    }

    let moderator_id: Option<serenity::UserId> = Option::from(entry.user_id);
    let moderator_tag = match moderator_id {
        Some(id) => match id.to_user(ctx).await {
            Ok(user) => Some(user.tag()),
            Err(e) => {
                tracing::debug!("Could not resolve moderator {}: {}", id, e);
                None
            }
        },
        None => None,
    };

    Some(ModerationAction {
        kind,
        guild_id: guild_id.get(),
        target_id: target.id.get(),
        target_tag: target.tag(),
        moderator_id: moderator_id.map(|id| id.get()),
        moderator_tag,
        reason: entry.reason,
    })
}
