// In-memory implementation of AbuseStore.
//
// Counters live for the lifetime of the process only. A restart forgets every
// moderator's history, which is acceptable for a rolling one-window counter.

use crate::core::abuse::{AbuseError, AbuseRecord, AbuseStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

/// Two-level map: guild ID -> moderator ID -> counter.
pub struct InMemoryAbuseStore {
    guilds: DashMap<u64, DashMap<u64, AbuseRecord>>,
}

impl InMemoryAbuseStore {
    pub fn new() -> Self {
        Self {
            guilds: DashMap::new(),
        }
    }
}

impl Default for InMemoryAbuseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AbuseStore for InMemoryAbuseStore {
    async fn increment(
        &self,
        guild_id: u64,
        moderator_id: u64,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<u32, AbuseError> {
        let guild = self.guilds.entry(guild_id).or_default();

        // Reset and increment happen under the same entry lock
        let mut record = guild
            .entry(moderator_id)
            .or_insert_with(|| AbuseRecord::new(now));
        Ok(record.increment(now, window))
    }

    async fn get(
        &self,
        guild_id: u64,
        moderator_id: u64,
    ) -> Result<Option<AbuseRecord>, AbuseError> {
        Ok(self
            .guilds
            .get(&guild_id)
            .and_then(|guild| guild.get(&moderator_id).map(|record| *record)))
    }

    async fn remove(&self, guild_id: u64, moderator_id: u64) -> Result<bool, AbuseError> {
        let removed = match self.guilds.get(&guild_id) {
            Some(guild) => guild.remove(&moderator_id).is_some(),
            None => false,
        };

        // Drop the guild map too once nobody is left in it
        self.guilds.remove_if(&guild_id, |_, guild| guild.is_empty());
        Ok(removed)
    }

    async fn remove_expired(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<usize, AbuseError> {
        let mut removed = 0;

        for guild in self.guilds.iter() {
            let before = guild.len();
            guild.retain(|_, record| !record.is_expired(now, window));
            removed += before - guild.len();
        }

        self.guilds.retain(|_, guild| !guild.is_empty());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[tokio::test]
    async fn test_increment_creates_record() {
        let store = InMemoryAbuseStore::new();
        let now = Utc::now();

        let count = store.increment(1, 10, now, HOUR).await.unwrap();
        assert_eq!(count, 1);

        let record = store.get(1, 10).await.unwrap().unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.first_action_time, now);
    }

    #[tokio::test]
    async fn test_increment_resets_after_window() {
        let store = InMemoryAbuseStore::new();
        let start = Utc::now();

        store.increment(1, 10, start, HOUR).await.unwrap();
        store.increment(1, 10, start, HOUR).await.unwrap();

        let later = start + chrono::Duration::minutes(61);
        let count = store.increment(1, 10, later, HOUR).await.unwrap();
        assert_eq!(count, 1);

        let record = store.get(1, 10).await.unwrap().unwrap();
        assert_eq!(record.first_action_time, later);
    }

    #[tokio::test]
    async fn test_remove_drops_empty_guild() {
        let store = InMemoryAbuseStore::new();
        let now = Utc::now();

        store.increment(1, 10, now, HOUR).await.unwrap();
        assert!(store.remove(1, 10).await.unwrap());
        assert!(store.guilds.get(&1).is_none());

        // Removing something that never existed is not an error
        assert!(!store.remove(2, 20).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_keeps_other_moderators() {
        let store = InMemoryAbuseStore::new();
        let now = Utc::now();

        store.increment(1, 10, now, HOUR).await.unwrap();
        store.increment(1, 11, now, HOUR).await.unwrap();
        store.remove(1, 10).await.unwrap();

        assert!(store.get(1, 10).await.unwrap().is_none());
        assert!(store.get(1, 11).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_expired() {
        let store = InMemoryAbuseStore::new();
        let start = Utc::now();

        store.increment(1, 10, start, HOUR).await.unwrap();
        store.increment(2, 20, start, HOUR).await.unwrap();
        store
            .increment(2, 21, start + chrono::Duration::minutes(45), HOUR)
            .await
            .unwrap();

        let removed = store
            .remove_expired(start + chrono::Duration::minutes(75), HOUR)
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert!(store.guilds.get(&1).is_none());
        assert!(store.get(2, 21).await.unwrap().is_some());
    }
}
