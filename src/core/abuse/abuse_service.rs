// Anti-abuse service - core business logic for the moderator action counter.
//
// This service handles:
// - Counting kicks/bans/timeouts per moderator per guild
// - Restarting the count once the window has elapsed
// - Reporting when the action limit is exceeded
// - Forgetting a moderator once the abuse cycle has been resolved
//
// NO Discord dependencies here - just pure domain logic.

use super::abuse_models::{AbuseConfig, AbuseRecord, ThresholdCheck};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AbuseError {
    // Never produced by the in-memory store.
    #[allow(dead_code)]
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for keeping abuse counters.
#[async_trait]
pub trait AbuseStore: Send + Sync {
    /// Count an action for a moderator, resetting the record first when its window
    /// has elapsed. Returns the new count.
    async fn increment(
        &self,
        guild_id: u64,
        moderator_id: u64,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<u32, AbuseError>;

    /// Get the current record for a moderator, if any.
    async fn get(&self, guild_id: u64, moderator_id: u64)
        -> Result<Option<AbuseRecord>, AbuseError>;

    /// Delete a moderator's record. Returns whether one existed.
    async fn remove(&self, guild_id: u64, moderator_id: u64) -> Result<bool, AbuseError>;

    /// Delete every record whose window has elapsed. Returns how many were dropped.
    async fn remove_expired(&self, now: DateTime<Utc>, window: Duration)
        -> Result<usize, AbuseError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Anti-abuse service for counting moderator actions.
pub struct AbuseService<S: AbuseStore> {
    store: S,
    config: AbuseConfig,
}

impl<S: AbuseStore> AbuseService<S> {
    /// Create a new anti-abuse service with the given store and thresholds.
    pub fn new(store: S, config: AbuseConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AbuseConfig {
        &self.config
    }

    /// Count an action taken right now.
    pub async fn record_action(
        &self,
        guild_id: u64,
        moderator_id: u64,
    ) -> Result<ThresholdCheck, AbuseError> {
        self.record_action_at(guild_id, moderator_id, Utc::now())
            .await
    }

    /// Count an action taken at `now`.
    ///
    /// # Returns
    /// `Exceeded` once the count inside the current window is above the action limit.
    pub async fn record_action_at(
        &self,
        guild_id: u64,
        moderator_id: u64,
        now: DateTime<Utc>,
    ) -> Result<ThresholdCheck, AbuseError> {
        let count = self
            .store
            .increment(guild_id, moderator_id, now, self.config.window)
            .await?;

        if count > self.config.action_limit {
            Ok(ThresholdCheck::Exceeded { count })
        } else {
            Ok(ThresholdCheck::WithinLimit { count })
        }
    }

    /// Forget a moderator once their abuse cycle has been handled.
    pub async fn resolve(&self, guild_id: u64, moderator_id: u64) -> Result<(), AbuseError> {
        self.store.remove(guild_id, moderator_id).await?;
        Ok(())
    }

    /// Clear a moderator's counter (admin action). Returns whether a counter existed.
    pub async fn reset(&self, guild_id: u64, moderator_id: u64) -> Result<bool, AbuseError> {
        self.store.remove(guild_id, moderator_id).await
    }

    /// Actions still counting toward the limit at `now`.
    pub async fn current_count(
        &self,
        guild_id: u64,
        moderator_id: u64,
        now: DateTime<Utc>,
    ) -> Result<u32, AbuseError> {
        let record = self.store.get(guild_id, moderator_id).await?;
        Ok(match record {
            Some(record) if !record.is_expired(now, self.config.window) => record.count,
            _ => 0,
        })
    }

    /// Drop counters whose window has elapsed.
    pub async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize, AbuseError> {
        self.store.remove_expired(now, self.config.window).await
    }

    pub fn threshold_summary(&self) -> String {
        self.config.threshold_summary()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;

    /// Flat in-memory store for testing
    struct MockAbuseStore {
        records: DashMap<(u64, u64), AbuseRecord>,
    }

    impl MockAbuseStore {
        fn new() -> Self {
            Self {
                records: DashMap::new(),
            }
        }
    }

    #[async_trait]
    impl AbuseStore for MockAbuseStore {
        async fn increment(
            &self,
            guild_id: u64,
            moderator_id: u64,
            now: DateTime<Utc>,
            window: Duration,
        ) -> Result<u32, AbuseError> {
            let mut record = self
                .records
                .entry((guild_id, moderator_id))
                .or_insert_with(|| AbuseRecord::new(now));
            Ok(record.increment(now, window))
        }

        async fn get(
            &self,
            guild_id: u64,
            moderator_id: u64,
        ) -> Result<Option<AbuseRecord>, AbuseError> {
            Ok(self.records.get(&(guild_id, moderator_id)).map(|r| *r))
        }

        async fn remove(&self, guild_id: u64, moderator_id: u64) -> Result<bool, AbuseError> {
            Ok(self.records.remove(&(guild_id, moderator_id)).is_some())
        }

        async fn remove_expired(
            &self,
            now: DateTime<Utc>,
            window: Duration,
        ) -> Result<usize, AbuseError> {
            let before = self.records.len();
            self.records.retain(|_, r| !r.is_expired(now, window));
            Ok(before - self.records.len())
        }
    }

    fn service() -> AbuseService<MockAbuseStore> {
        AbuseService::new(MockAbuseStore::new(), AbuseConfig::default())
    }

    #[tokio::test]
    async fn test_actions_within_limit() {
        let service = service();
        let now = Utc::now();

        for expected in 1..=3 {
            let result = service.record_action_at(1, 10, now).await.unwrap();
            assert_eq!(result, ThresholdCheck::WithinLimit { count: expected });
        }
    }

    #[tokio::test]
    async fn test_fourth_action_exceeds_limit() {
        let service = service();
        let now = Utc::now();

        for _ in 0..3 {
            service.record_action_at(1, 10, now).await.unwrap();
        }

        let result = service
            .record_action_at(1, 10, now + chrono::Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(result, ThresholdCheck::Exceeded { count: 4 });
    }

    #[tokio::test]
    async fn test_window_expiry_restarts_count() {
        let service = service();
        let start = Utc::now();

        for _ in 0..3 {
            service.record_action_at(1, 10, start).await.unwrap();
        }

        // Just past the hour, the old actions no longer count
        let later = start + chrono::Duration::minutes(61);
        let result = service.record_action_at(1, 10, later).await.unwrap();
        assert_eq!(result, ThresholdCheck::WithinLimit { count: 1 });
    }

    #[tokio::test]
    async fn test_window_boundary_is_inclusive() {
        let service = service();
        let start = Utc::now();

        for _ in 0..3 {
            service.record_action_at(1, 10, start).await.unwrap();
        }

        // Exactly one window later is not "more than" a window
        let result = service
            .record_action_at(1, 10, start + chrono::Duration::minutes(60))
            .await
            .unwrap();
        assert!(result.is_exceeded());
    }

    #[tokio::test]
    async fn test_counters_are_per_guild_and_moderator() {
        let service = service();
        let now = Utc::now();

        for _ in 0..3 {
            service.record_action_at(1, 10, now).await.unwrap();
        }

        let other_mod = service.record_action_at(1, 11, now).await.unwrap();
        let other_guild = service.record_action_at(2, 10, now).await.unwrap();

        assert_eq!(other_mod.count(), 1);
        assert_eq!(other_guild.count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_clears_counter() {
        let service = service();
        let now = Utc::now();

        for _ in 0..4 {
            service.record_action_at(1, 10, now).await.unwrap();
        }
        service.resolve(1, 10).await.unwrap();

        assert_eq!(service.current_count(1, 10, now).await.unwrap(), 0);
        let result = service.record_action_at(1, 10, now).await.unwrap();
        assert_eq!(result, ThresholdCheck::WithinLimit { count: 1 });
    }

    #[tokio::test]
    async fn test_every_resolution_restarts_the_count() {
        use crate::core::abuse::AbuseResolution;

        let service = service();
        let now = Utc::now();
        let branches = [
            (false, false, AbuseResolution::MemberNotFound),
            (true, false, AbuseResolution::ReportOnly),
            (true, true, AbuseResolution::RemoveRole),
        ];

        for (member_found, has_role, expected) in branches {
            for _ in 0..3 {
                service.record_action_at(1, 10, now).await.unwrap();
            }
            let check = service.record_action_at(1, 10, now).await.unwrap();
            assert!(check.is_exceeded());

            assert_eq!(AbuseResolution::decide(member_found, has_role), expected);
            service.resolve(1, 10).await.unwrap();

            assert_eq!(service.current_count(1, 10, now).await.unwrap(), 0);
            let next = service.record_action_at(1, 10, now).await.unwrap();
            assert_eq!(next, ThresholdCheck::WithinLimit { count: 1 });
            service.resolve(1, 10).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_reset_reports_existing_counter() {
        let service = service();
        let now = Utc::now();

        service.record_action_at(1, 10, now).await.unwrap();

        assert!(service.reset(1, 10).await.unwrap());
        assert!(!service.reset(1, 10).await.unwrap());
    }

    #[tokio::test]
    async fn test_current_count_ignores_expired_record() {
        let service = service();
        let start = Utc::now();

        service.record_action_at(1, 10, start).await.unwrap();
        service.record_action_at(1, 10, start).await.unwrap();

        assert_eq!(service.current_count(1, 10, start).await.unwrap(), 2);
        let later = start + chrono::Duration::hours(2);
        assert_eq!(service.current_count(1, 10, later).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prune_expired_keeps_active_records() {
        let service = service();
        let start = Utc::now();

        service.record_action_at(1, 10, start).await.unwrap();
        service
            .record_action_at(1, 11, start + chrono::Duration::minutes(50))
            .await
            .unwrap();

        let removed = service
            .prune_expired(start + chrono::Duration::minutes(90))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        let now = start + chrono::Duration::minutes(90);
        assert_eq!(service.current_count(1, 11, now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_custom_limit() {
        let config = AbuseConfig {
            action_limit: 1,
            window: Duration::from_secs(60),
        };
        let service = AbuseService::new(MockAbuseStore::new(), config);
        let now = Utc::now();

        assert!(!service.record_action_at(1, 10, now).await.unwrap().is_exceeded());
        assert!(service.record_action_at(1, 10, now).await.unwrap().is_exceeded());
        assert_eq!(service.threshold_summary(), "1 per 1 minutes");
    }
}
