use crate::core::abuse::{AbuseConfig, ModActionKind, ModLogEvent, ModerationAction};
use poise::serenity_prelude::{self as serenity, CreateEmbed};

// Discord rejects field values over 1024 chars; error dumps are cut well below that.
const MAX_ERROR_CHARS: usize = 900;

const YELLOW: serenity::Colour = serenity::Colour(0xFEE75C);
const GREEN: serenity::Colour = serenity::Colour(0x57F287);

/// Plain description of an embed, kept separate from the builder so the
/// wording can be checked in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedParts {
    pub title: String,
    pub description: String,
    pub fields: Vec<(String, String, bool)>,
    pub colour: serenity::Colour,
}

impl EmbedParts {
    fn new(title: &str, description: String, colour: serenity::Colour) -> Self {
        Self {
            title: title.to_string(),
            description,
            fields: Vec::new(),
            colour,
        }
    }

    fn field(mut self, name: &str, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push((name.to_string(), value.into(), inline));
        self
    }

    pub fn into_embed(self) -> CreateEmbed {
        CreateEmbed::new()
            .title(self.title)
            .description(self.description)
            .fields(self.fields)
            .color(self.colour)
            .timestamp(serenity::Timestamp::now())
    }
}

pub fn format_log_event(event: &ModLogEvent) -> CreateEmbed {
    describe_log_event(event).into_embed()
}

pub fn describe_log_event(event: &ModLogEvent) -> EmbedParts {
    match event {
        ModLogEvent::ActionTaken(action) => describe_action(action),

        ModLogEvent::MemberNotFound {
            guild_name,
            moderator_id,
        } => EmbedParts::new(
            "⚠️ Anti-Abuse Triggered (member not found)",
            format!(
                "Moderator with ID `{}` triggered anti-abuse in guild **{}** but could not be fetched.",
                moderator_id, guild_name
            ),
            serenity::Colour::ORANGE,
        ),

        ModLogEvent::ThresholdReached {
            guild_name,
            moderator_tag,
            moderator_id,
            count,
            threshold,
        } => EmbedParts::new(
            "⚠️ Anti-Abuse Threshold Reached",
            format!(
                "{} ({}) exceeded the punishment threshold ({}) but does not have the monitored admin role.",
                moderator_tag, moderator_id, count
            ),
            YELLOW,
        )
        .field("Guild", guild_name.as_str(), true)
        .field("Moderator", format!("{} ({})", moderator_tag, moderator_id), true)
        .field("Threshold", threshold.as_str(), true),

        ModLogEvent::RoleRemovalFailed {
            moderator_tag,
            moderator_id,
            error,
        } => EmbedParts::new(
            "❌ Failed to Remove Admin Role",
            format!(
                "Could not remove admin role from {} ({}).",
                moderator_tag, moderator_id
            ),
            serenity::Colour::DARK_RED,
        )
        .field("Error", truncate_chars(error, MAX_ERROR_CHARS), false),

        ModLogEvent::RoleRemoved {
            guild_name,
            moderator_tag,
            moderator_id,
            threshold,
        } => EmbedParts::new(
            "⚠️ Admin Role Removed (Anti-Abuse)",
            format!(
                "{} ({}) had the admin role removed after exceeding punishment threshold.",
                moderator_tag, moderator_id
            ),
            serenity::Colour::DARK_RED,
        )
        .field("Moderator", format!("{} ({})", moderator_tag, moderator_id), true)
        .field("Guild", guild_name.as_str(), true)
        .field("Threshold", threshold.as_str(), true),

        ModLogEvent::TestMessage => EmbedParts::new(
            "✅ Test Log Message",
            "This message confirms the bot can post to its log channel.".to_string(),
            GREEN,
        ),
    }
}

fn describe_action(action: &ModerationAction) -> EmbedParts {
    let (title, colour) = match action.kind {
        ModActionKind::Kick => ("Member Kicked", serenity::Colour::ORANGE),
        ModActionKind::Ban => ("Member Banned", serenity::Colour::RED),
        ModActionKind::Timeout => ("Member Timed Out", serenity::Colour::ORANGE),
    };

    EmbedParts::new(
        title,
        format!("Target: {} ({})", action.target_tag, action.target_id),
        colour,
    )
    .field(
        "Moderator",
        action.moderator_tag.as_deref().unwrap_or("Unknown"),
        true,
    )
    .field(
        "Reason",
        action.reason.as_deref().unwrap_or("Not specified"),
        true,
    )
}

/// DM sent to a moderator who just lost the monitored role.
pub fn format_role_removed_dm(config: &AbuseConfig, guild_name: &str) -> CreateEmbed {
    describe_role_removed_dm(config, guild_name).into_embed()
}

pub fn describe_role_removed_dm(config: &AbuseConfig, guild_name: &str) -> EmbedParts {
    EmbedParts::new(
        "⚠️ Admin Role Removed",
        "Your admin role has been removed.".to_string(),
        serenity::Colour::DARK_RED,
    )
    .field(
        "Reason",
        format!(
            "You exceeded {} kicks/bans/timeouts within {} minutes.",
            config.action_limit,
            config.window_minutes()
        ),
        false,
    )
    .field("Guild", guild_name, true)
}

/// Cut `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
