// Anti-abuse domain models - data structures for the moderator action counter.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer turns them into embeds, role edits and DMs.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// The kind of punitive action a moderator performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModActionKind {
    Kick,
    Ban,
    Timeout,
}

impl std::fmt::Display for ModActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModActionKind::Kick => write!(f, "Kick"),
            ModActionKind::Ban => write!(f, "Ban"),
            ModActionKind::Timeout => write!(f, "Timeout"),
        }
    }
}

/// A moderator action recovered from the audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationAction {
    pub kind: ModActionKind,
    pub guild_id: u64,
    pub target_id: u64,
    pub target_tag: String,
    /// Missing when the audit log entry carries no executor.
    pub moderator_id: Option<u64>,
    pub moderator_tag: Option<String>,
    pub reason: Option<String>,
}

/// Counter for one moderator in one guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbuseRecord {
    pub count: u32,
    pub first_action_time: DateTime<Utc>,
}

impl AbuseRecord {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            first_action_time: now,
        }
    }

    /// True once more than `window` has passed since the first counted action.
    pub fn is_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match chrono::Duration::from_std(window) {
            Ok(window) => now - self.first_action_time > window,
            // A window too large for chrono never expires.
            Err(_) => false,
        }
    }

    /// Count one action, restarting the window first if it has elapsed.
    pub fn increment(&mut self, now: DateTime<Utc>, window: Duration) -> u32 {
        if self.is_expired(now, window) {
            self.count = 0;
            self.first_action_time = now;
        }
        self.count = self.count.saturating_add(1);
        self.count
    }
}

/// Anti-abuse thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbuseConfig {
    /// More actions than this inside the window trigger the anti-abuse response.
    pub action_limit: u32,
    /// Length of the rolling window.
    pub window: Duration,
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            action_limit: 3,                      // 3 actions...
            window: Duration::from_secs(60 * 60), // ...per hour
        }
    }
}

impl AbuseConfig {
    pub fn window_minutes(&self) -> u64 {
        self.window.as_secs() / 60
    }

    /// Human readable threshold, e.g. "3 per 60 minutes".
    pub fn threshold_summary(&self) -> String {
        format!("{} per {} minutes", self.action_limit, self.window_minutes())
    }
}

/// Outcome of counting a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdCheck {
    WithinLimit { count: u32 },
    Exceeded { count: u32 },
}

impl ThresholdCheck {
    pub fn count(&self) -> u32 {
        match self {
            ThresholdCheck::WithinLimit { count } | ThresholdCheck::Exceeded { count } => *count,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        matches!(self, ThresholdCheck::Exceeded { .. })
    }
}

/// What to do with a moderator who went over the limit.
///
/// Every outcome ends with the moderator's counter being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbuseResolution {
    /// The moderator could not be fetched from the guild; only report it.
    MemberNotFound,
    /// The moderator does not hold the monitored role; only report it.
    ReportOnly,
    /// Remove the monitored role, DM the moderator and report it.
    RemoveRole,
}

impl AbuseResolution {
    pub fn decide(member_found: bool, has_role: bool) -> Self {
        match (member_found, has_role) {
            (false, _) => AbuseResolution::MemberNotFound,
            (true, false) => AbuseResolution::ReportOnly,
            (true, true) => AbuseResolution::RemoveRole,
        }
    }
}

/// Everything that ends up in the log channel.
#[derive(Debug, Clone)]
pub enum ModLogEvent {
    /// A kick, ban or timeout was performed.
    ActionTaken(ModerationAction),
    /// Threshold exceeded but the moderator could not be fetched from the guild.
    MemberNotFound {
        guild_name: String,
        moderator_id: u64,
    },
    /// Threshold exceeded by someone who does not hold the monitored role.
    ThresholdReached {
        guild_name: String,
        moderator_tag: String,
        moderator_id: u64,
        count: u32,
        threshold: String,
    },
    /// Removing the monitored role failed.
    RoleRemovalFailed {
        moderator_tag: String,
        moderator_id: u64,
        error: String,
    },
    /// The monitored role was removed.
    RoleRemoved {
        guild_name: String,
        moderator_tag: String,
        moderator_id: u64,
        threshold: String,
    },
    /// Manual check that the log channel is writable.
    TestMessage,
}
