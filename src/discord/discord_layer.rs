// Discord layer - commands, event handlers and log channel output.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "logging/mod.rs"]
pub mod logging;

#[path = "moderation/mod.rs"]
pub mod moderation;

use crate::core::abuse::AbuseService;
use crate::infra::abuse::InMemoryAbuseStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands and event handlers.
pub struct Data {
    pub abuse: Arc<AbuseService<InMemoryAbuseStore>>,
    /// Where moderation actions and anti-abuse reports are posted.
    pub log_channel_id: serenity::ChannelId,
    /// Role taken away from a moderator who goes over the limit.
    pub admin_role_id: serenity::RoleId,
}
