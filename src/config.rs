// Startup configuration read from the environment (and a .env file, if present).
//
// A missing or malformed required value is fatal: main() refuses to start the
// bot rather than run without a log channel or a role to protect.

use crate::core::abuse::AbuseConfig;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    Missing(&'static str),

    #[error("{name} must be a positive integer, got {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub log_channel_id: u64,
    pub admin_role_id: u64,
    pub abuse: AbuseConfig,
    /// Post a test embed to the log channel once the bot is ready.
    pub log_test_on_ready: bool,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any key lookup so it can be tested without touching
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let token = required("DISCORD_TOKEN")?;
        let log_channel_id = parse_positive("LOG_CHANNEL_ID", required("LOG_CHANNEL_ID")?)?;
        let admin_role_id = parse_positive("ADMIN_ROLE_ID", required("ADMIN_ROLE_ID")?)?;

        let defaults = AbuseConfig::default();
        let action_limit = match lookup("ABUSE_ACTION_LIMIT") {
            Some(v) => parse_limit("ABUSE_ACTION_LIMIT", v)?,
            None => defaults.action_limit,
        };
        let window = match lookup("ABUSE_WINDOW_MINUTES") {
            Some(v) => {
                let minutes = parse_limit("ABUSE_WINDOW_MINUTES", v)?;
                Duration::from_secs(u64::from(minutes) * 60)
            }
            None => defaults.window,
        };

        let log_test_on_ready = lookup("LOG_TEST_ON_READY")
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(false);

        Ok(Self {
            token,
            log_channel_id,
            admin_role_id,
            abuse: AbuseConfig {
                action_limit,
                window,
            },
            log_test_on_ready,
        })
    }
}

/// Discord snowflakes and our thresholds are never zero.
fn parse_positive(name: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}

fn parse_limit(name: &'static str, value: String) -> Result<u32, ConfigError> {
    let n = parse_positive(name, value.clone())?;
    u32::try_from(n).map_err(|_| ConfigError::Invalid { name, value })
}
