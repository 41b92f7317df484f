//! Record store: the durable registration ledger with duplicate-checked
//! insertion.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::dao::{
    models::{RegistrationEntity, canonical_id},
    snapshot::SnapshotStore,
    storage::StorageResult,
};

/// Outcome of a duplicate-checked insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was appended and persisted.
    Accepted,
    /// A record with the same (participant, event) identity key already
    /// exists; storage was left untouched.
    Duplicate,
}

/// Append-only collection of registration records backed by a snapshot store.
///
/// Records are never mutated or deleted; the only write path is the
/// duplicate-checked [`insert`](RegistrationRegistry::insert).
pub struct RegistrationRegistry {
    store: Arc<dyn SnapshotStore<RegistrationEntity>>,
    write_gate: Mutex<()>,
}

impl RegistrationRegistry {
    /// Wrap a snapshot store as the registration ledger.
    pub fn new(store: Arc<dyn SnapshotStore<RegistrationEntity>>) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    /// Insert `record` unless its identity key is already present.
    ///
    /// The whole load-check-append-persist sequence runs under the write gate
    /// so two concurrent submissions for the same pair cannot both pass the
    /// duplicate check. The guard drops on every exit path, storage faults
    /// included.
    pub async fn insert(&self, record: RegistrationEntity) -> StorageResult<InsertOutcome> {
        let _gate = self.write_gate.lock().await;

        let mut records = self.store.load().await?;
        if records
            .iter()
            .any(|existing| existing.identity_matches(&record.participant_id, &record.event_id))
        {
            return Ok(InsertOutcome::Duplicate);
        }

        records.push(record);
        self.store.save(records).await?;
        Ok(InsertOutcome::Accepted)
    }

    /// Every stored record, in insertion order.
    pub async fn list_all(&self) -> StorageResult<Vec<RegistrationEntity>> {
        self.store.load().await
    }

    /// Records submitted by one participant, in insertion order.
    pub async fn find_by_participant(
        &self,
        participant_id: &str,
    ) -> StorageResult<Vec<RegistrationEntity>> {
        let target = canonical_id(participant_id);
        let records = self.store.load().await?;
        Ok(records
            .into_iter()
            .filter(|record| canonical_id(&record.participant_id) == target)
            .collect())
    }

    /// True when a record exists for the exact (participant, event) pair.
    pub async fn exists(&self, participant_id: &str, event_id: &str) -> StorageResult<bool> {
        let records = self.store.load().await?;
        Ok(records
            .iter()
            .any(|record| record.identity_matches(participant_id, event_id)))
    }

    /// Probe the backing store.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.store.health_check().await
    }
}
