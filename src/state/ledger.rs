//! Delivery ledger: append-only record of notification attempts.
//!
//! Each appended entry marks a (campaign, recipient) pair as attempted
//! forever. Failed attempts count just like successful ones, which is what
//! keeps re-running a campaign from re-sending to anyone.

use std::{collections::HashSet, sync::Arc, time::SystemTime};

use indexmap::IndexMap;
use tokio::sync::Mutex;

use crate::dao::{
    models::{NotificationAttemptEntity, canonical_id},
    snapshot::SnapshotStore,
    storage::StorageResult,
};

/// Aggregated totals for one campaign occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignTotals {
    /// Composite `{event}_{date}` key of the occurrence.
    pub campaign_key: String,
    /// Event identifier parsed out of the first recorded attempt.
    pub event_id: String,
    /// Target date of the occurrence.
    pub target_date: String,
    /// Number of recorded attempts, successes and failures alike.
    pub total: usize,
    /// Number of attempts that reported successful delivery.
    pub successful: usize,
    /// Timestamp of the earliest recorded attempt.
    pub first_attempt: SystemTime,
}

/// Append-only ledger of delivery attempts backed by a snapshot store.
pub struct NotificationLedger {
    store: Arc<dyn SnapshotStore<NotificationAttemptEntity>>,
    write_gate: Mutex<()>,
}

impl NotificationLedger {
    /// Wrap a snapshot store as the delivery ledger.
    pub fn new(store: Arc<dyn SnapshotStore<NotificationAttemptEntity>>) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    /// True when any attempt, failed or not, is recorded for the pair.
    pub async fn already_attempted(
        &self,
        campaign_key: &str,
        recipient_id: &str,
    ) -> StorageResult<bool> {
        let target = canonical_id(recipient_id);
        let attempts = self.store.load().await?;
        Ok(attempts.iter().any(|attempt| {
            attempt.campaign_key == campaign_key && canonical_id(&attempt.recipient_id) == target
        }))
    }

    /// Recipients with a recorded attempt for the campaign, canonicalized.
    pub async fn attempted_recipients(&self, campaign_key: &str) -> StorageResult<HashSet<String>> {
        let attempts = self.store.load().await?;
        Ok(attempts
            .iter()
            .filter(|attempt| attempt.campaign_key == campaign_key)
            .map(|attempt| canonical_id(&attempt.recipient_id))
            .collect())
    }

    /// Append one attempt and persist the ledger immediately.
    ///
    /// Persisting per attempt keeps the exactly-once guarantee intact across
    /// a crash mid-campaign: everything already sent is already on disk.
    pub async fn record_attempt(&self, attempt: NotificationAttemptEntity) -> StorageResult<()> {
        let _gate = self.write_gate.lock().await;

        let mut attempts = self.store.load().await?;
        attempts.push(attempt);
        self.store.save(attempts).await
    }

    /// Totals for a single campaign, or `None` when nothing was recorded.
    pub async fn campaign_summary(
        &self,
        campaign_key: &str,
    ) -> StorageResult<Option<CampaignTotals>> {
        let summaries = self.all_campaign_summaries().await?;
        Ok(summaries
            .into_iter()
            .find(|summary| summary.campaign_key == campaign_key))
    }

    /// Totals for every recorded campaign, most recent first.
    pub async fn all_campaign_summaries(&self) -> StorageResult<Vec<CampaignTotals>> {
        let attempts = self.store.load().await?;

        let mut grouped: IndexMap<String, CampaignTotals> = IndexMap::new();
        for attempt in &attempts {
            let entry = grouped
                .entry(attempt.campaign_key.clone())
                .or_insert_with(|| CampaignTotals {
                    campaign_key: attempt.campaign_key.clone(),
                    event_id: attempt.event_id.clone(),
                    target_date: attempt.target_date.clone(),
                    total: 0,
                    successful: 0,
                    first_attempt: attempt.attempted_at,
                });
            entry.total += 1;
            if attempt.succeeded {
                entry.successful += 1;
            }
            if attempt.attempted_at < entry.first_attempt {
                entry.first_attempt = attempt.attempted_at;
            }
        }

        let mut summaries: Vec<CampaignTotals> = grouped.into_values().collect();
        summaries.sort_by(|a, b| b.first_attempt.cmp(&a.first_attempt));
        Ok(summaries)
    }

    /// Probe the backing store.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{models::campaign_key, snapshot::memory::MemoryStore};
    use std::time::Duration;

    fn attempt_at(
        event_id: &str,
        target_date: &str,
        recipient_id: &str,
        succeeded: bool,
        offset_secs: u64,
    ) -> NotificationAttemptEntity {
        let mut attempt =
            NotificationAttemptEntity::new(event_id, target_date, recipient_id, succeeded);
        attempt.attempted_at = SystemTime::UNIX_EPOCH + Duration::from_secs(offset_secs);
        attempt
    }

    fn ledger() -> NotificationLedger {
        NotificationLedger::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn failed_attempts_count_as_attempted() {
        let ledger = ledger();
        let key = campaign_key("dota", "2024-06-01");

        ledger
            .record_attempt(attempt_at("dota", "2024-06-01", "42", false, 0))
            .await
            .unwrap();

        assert!(ledger.already_attempted(&key, "42").await.unwrap());
        assert!(ledger.already_attempted(&key, " 42 ").await.unwrap());
        assert!(!ledger.already_attempted(&key, "43").await.unwrap());
    }

    #[tokio::test]
    async fn attempted_recipients_collects_the_campaign_only() {
        let ledger = ledger();

        ledger
            .record_attempt(attempt_at("dota", "2024-06-01", "42", true, 0))
            .await
            .unwrap();
        ledger
            .record_attempt(attempt_at("dota", "2024-06-01", "43", false, 1))
            .await
            .unwrap();
        ledger
            .record_attempt(attempt_at("cs2", "2024-06-01", "44", true, 2))
            .await
            .unwrap();

        let recipients = ledger
            .attempted_recipients(&campaign_key("dota", "2024-06-01"))
            .await
            .unwrap();
        assert_eq!(recipients.len(), 2);
        assert!(recipients.contains("42"));
        assert!(recipients.contains("43"));
    }

    #[tokio::test]
    async fn summary_counts_totals_and_successes() {
        let ledger = ledger();

        ledger
            .record_attempt(attempt_at("dota", "2024-06-01", "42", true, 0))
            .await
            .unwrap();
        ledger
            .record_attempt(attempt_at("dota", "2024-06-01", "43", false, 1))
            .await
            .unwrap();
        ledger
            .record_attempt(attempt_at("dota", "2024-06-01", "44", true, 2))
            .await
            .unwrap();

        let summary = ledger
            .campaign_summary(&campaign_key("dota", "2024-06-01"))
            .await
            .unwrap()
            .expect("summary present");
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.event_id, "dota");
        assert_eq!(summary.target_date, "2024-06-01");
        assert_eq!(summary.first_attempt, SystemTime::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn unknown_campaign_has_no_summary() {
        let ledger = ledger();
        let summary = ledger
            .campaign_summary(&campaign_key("dota", "2024-06-01"))
            .await
            .unwrap();
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn summaries_are_ordered_most_recent_first() {
        let ledger = ledger();

        ledger
            .record_attempt(attempt_at("dota", "2024-06-01", "42", true, 100))
            .await
            .unwrap();
        ledger
            .record_attempt(attempt_at("cs2", "2024-06-02", "42", true, 200))
            .await
            .unwrap();
        ledger
            .record_attempt(attempt_at("dota", "2024-06-01", "43", true, 300))
            .await
            .unwrap();

        let summaries = ledger.all_campaign_summaries().await.unwrap();
        let keys: Vec<&str> = summaries
            .iter()
            .map(|summary| summary.campaign_key.as_str())
            .collect();
        assert_eq!(keys, vec!["cs2_2024-06-02", "dota_2024-06-01"]);
    }
}
