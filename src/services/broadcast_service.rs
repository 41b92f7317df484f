//! Campaign runner delivering one-time notifications to event participants.

use std::collections::HashSet;

use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::{
    dao::models::{NotificationAttemptEntity, campaign_key, canonical_id},
    dto::admin::{BroadcastRequest, BroadcastResponse, RecipientOutcome},
    error::ServiceError,
    state::SharedState,
};

/// Run one notification campaign for an event occurrence.
///
/// Recipients are the distinct registered participants of the event minus
/// everyone already on the delivery ledger for this campaign key, so invoking
/// the same campaign twice sends nothing new. Deliveries run sequentially
/// with a pause between sends; a failed or timed-out delivery is recorded and
/// skipped past, while a ledger write fault aborts the run.
pub async fn run_broadcast(
    state: &SharedState,
    payload: BroadcastRequest,
) -> Result<BroadcastResponse, ServiceError> {
    if !state.authorizer().is_authorized(&payload.caller_id) {
        return Err(ServiceError::Forbidden(
            "broadcasts require the administrator identity".into(),
        ));
    }

    let event_id = canonical_id(&payload.event_id);
    let target_date = canonical_id(&payload.target_date);
    if event_id.is_empty() || target_date.is_empty() {
        return Err(ServiceError::InvalidInput(
            "event_id and target_date must both be provided".into(),
        ));
    }

    // One campaign at a time; a second admin request waits here instead of
    // racing the ledger.
    let _run = state.broadcast_gate().lock().await;

    let key = campaign_key(&event_id, &target_date);

    let records = state.registry().list_all().await?;
    let mut recipients: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for record in &records {
        if canonical_id(&record.event_id) != event_id {
            continue;
        }
        let recipient = canonical_id(&record.participant_id);
        if seen.insert(recipient.clone()) {
            recipients.push(recipient);
        }
    }

    // Failed attempts count as attempted and are filtered out as well.
    // TODO: admin-triggered retry that re-targets the failed attempts of a
    // campaign.
    let attempted_before = state.ledger().attempted_recipients(&key).await?;
    let pending: Vec<String> = recipients
        .iter()
        .filter(|recipient| !attempted_before.contains(recipient.as_str()))
        .cloned()
        .collect();
    let already_notified = recipients.len() - pending.len();

    let message = compose_message(state, &event_id, &target_date);

    info!(
        campaign = %key,
        recipients = recipients.len(),
        already_notified,
        pending = pending.len(),
        "starting broadcast run"
    );

    let transport = state.transport();
    let mut outcomes = Vec::with_capacity(pending.len());
    let mut delivered = 0usize;
    for (index, recipient) in pending.iter().enumerate() {
        if index > 0 {
            sleep(state.send_delay()).await;
        }

        let send = transport.notify(recipient.clone(), message.clone());
        let succeeded = match timeout(state.notify_timeout(), send).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(campaign = %key, recipient = %recipient, error = %err, "delivery failed");
                false
            }
            Err(_) => {
                warn!(campaign = %key, recipient = %recipient, "delivery timed out");
                false
            }
        };

        state
            .ledger()
            .record_attempt(NotificationAttemptEntity::new(
                &event_id,
                &target_date,
                recipient,
                succeeded,
            ))
            .await?;

        if succeeded {
            delivered += 1;
        }
        outcomes.push(RecipientOutcome {
            recipient_id: recipient.clone(),
            delivered: succeeded,
        });
    }

    let failed = outcomes.len() - delivered;
    info!(
        campaign = %key,
        attempted = outcomes.len(),
        delivered,
        failed,
        "broadcast run finished"
    );

    Ok(BroadcastResponse {
        campaign_key: key,
        recipients: recipients.len(),
        already_notified,
        attempted: outcomes.len(),
        delivered,
        failed,
        outcomes,
    })
}

/// Message sent to every recipient of a campaign.
fn compose_message(state: &SharedState, event_id: &str, target_date: &str) -> String {
    let name = state.events().display_name(event_id);
    let link = state.events().delivery_link(event_id);
    format!("Tournament day! {name} is scheduled for {target_date}. Match details: {link}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex as StdMutex},
        time::{Duration, SystemTime},
    };

    use futures::future::BoxFuture;

    use crate::{
        config::{AppConfig, FALLBACK_DELIVERY_LINK},
        dao::{
            mirror::DisabledMirror,
            models::RegistrationEntity,
            notifier::{DeliveryError, NotificationTransport},
            snapshot::{SnapshotStore, memory::MemoryStore},
            storage::{StorageError, StorageResult},
        },
        services::auth::StaticAdminAuthorizer,
        state::AppState,
    };

    const ADMIN: &str = "100500";

    struct RecordingTransport {
        sent: Arc<StdMutex<Vec<(String, String)>>>,
        fail_for: Vec<String>,
    }

    impl NotificationTransport for RecordingTransport {
        fn notify(
            &self,
            recipient_id: String,
            message: String,
        ) -> BoxFuture<'static, Result<(), DeliveryError>> {
            let sent = Arc::clone(&self.sent);
            let fail = self.fail_for.contains(&recipient_id);
            Box::pin(async move {
                sent.lock().unwrap().push((recipient_id, message));
                if fail {
                    Err(DeliveryError::Rejected { status: 500 })
                } else {
                    Ok(())
                }
            })
        }
    }

    struct NeverRespondsTransport;

    impl NotificationTransport for NeverRespondsTransport {
        fn notify(
            &self,
            _recipient_id: String,
            _message: String,
        ) -> BoxFuture<'static, Result<(), DeliveryError>> {
            Box::pin(std::future::pending())
        }
    }

    /// Attempts store whose saves always fail, simulating a full disk.
    struct ReadOnlyStore;

    impl SnapshotStore<NotificationAttemptEntity> for ReadOnlyStore {
        fn load(&self) -> BoxFuture<'static, StorageResult<Vec<NotificationAttemptEntity>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn save(
            &self,
            _items: Vec<NotificationAttemptEntity>,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async {
                Err(StorageError::unavailable(
                    "attempts snapshot is read-only".into(),
                    io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                ))
            })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    struct Harness {
        state: SharedState,
        sent: Arc<StdMutex<Vec<(String, String)>>>,
    }

    fn harness(fail_for: &[&str]) -> Harness {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let transport = Arc::new(RecordingTransport {
            sent: Arc::clone(&sent),
            fail_for: fail_for.iter().map(|id| (*id).to_owned()).collect(),
        });
        let attempts: Arc<dyn SnapshotStore<NotificationAttemptEntity>> =
            Arc::new(MemoryStore::new());
        Harness {
            state: build_state(transport, attempts),
            sent,
        }
    }

    fn build_state(
        transport: Arc<dyn NotificationTransport>,
        attempts: Arc<dyn SnapshotStore<NotificationAttemptEntity>>,
    ) -> SharedState {
        let config = AppConfig {
            send_delay: Duration::ZERO,
            ..AppConfig::default()
        };
        let registrations: Arc<dyn SnapshotStore<RegistrationEntity>> =
            Arc::new(MemoryStore::new());
        AppState::new(
            &config,
            registrations,
            attempts,
            Arc::new(DisabledMirror),
            transport,
            Arc::new(StaticAdminAuthorizer::new(Some(ADMIN.into()))),
        )
    }

    async fn seed(state: &SharedState, participant_id: &str, event_id: &str) {
        let record = RegistrationEntity {
            participant_id: participant_id.into(),
            participant_name: "Player".into(),
            group_id: "g1".into(),
            group_name: "Group One".into(),
            event_id: event_id.into(),
            event_name: "Event".into(),
            phone: "+70000000000".into(),
            submitted_at: SystemTime::UNIX_EPOCH,
        };
        state.registry().insert(record).await.unwrap();
    }

    fn request(caller_id: &str, event_id: &str, target_date: &str) -> BroadcastRequest {
        BroadcastRequest {
            caller_id: caller_id.into(),
            event_id: event_id.into(),
            target_date: target_date.into(),
        }
    }

    #[tokio::test]
    async fn non_admin_is_rejected_without_side_effects() {
        let harness = harness(&[]);
        seed(&harness.state, "42", "dota").await;

        let err = run_broadcast(&harness.state, request("999", "dota", "2024-06-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(harness.sent.lock().unwrap().is_empty());
        assert!(
            harness
                .state
                .ledger()
                .all_campaign_summaries()
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn authorization_is_checked_before_validation() {
        let harness = harness(&[]);

        let err = run_broadcast(&harness.state, request("999", "", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        // A body that omits target_date entirely must take the same path: the
        // field deserializes blank instead of failing in the extractor, so a
        // non-admin caller still gets Forbidden and an admin gets the
        // invalid-input answer.
        let payload: BroadcastRequest =
            serde_json::from_str(r#"{"caller_id": "999", "event_id": "dota"}"#).unwrap();
        let err = run_broadcast(&harness.state, payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let payload: BroadcastRequest =
            serde_json::from_str(&format!(r#"{{"caller_id": "{ADMIN}", "event_id": "dota"}}"#))
                .unwrap();
        let err = run_broadcast(&harness.state, payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn blank_event_or_date_is_invalid() {
        let harness = harness(&[]);

        let err = run_broadcast(&harness.state, request(ADMIN, "  ", "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = run_broadcast(&harness.state, request(ADMIN, "dota", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn first_run_delivers_to_every_registered_participant() {
        let harness = harness(&[]);
        seed(&harness.state, "42", "dota").await;
        seed(&harness.state, "43", "dota").await;
        seed(&harness.state, "44", "cs2").await;

        let summary = run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();

        assert_eq!(summary.campaign_key, "dota_2024-06-01");
        assert_eq!(summary.recipients, 2);
        assert_eq!(summary.already_notified, 0);
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed, 0);

        let sent = harness.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "42");
        assert_eq!(sent[1].0, "43");
        assert!(sent[0].1.contains("Dota 2"));
        assert!(sent[0].1.contains("2024-06-01"));
    }

    #[tokio::test]
    async fn rerun_of_the_same_campaign_sends_nothing() {
        let harness = harness(&[]);
        seed(&harness.state, "42", "dota").await;
        seed(&harness.state, "43", "dota").await;

        run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();
        let second = run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();

        assert_eq!(second.attempted, 0);
        assert_eq!(second.already_notified, 2);
        assert_eq!(harness.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn other_date_is_a_fresh_campaign() {
        let harness = harness(&[]);
        seed(&harness.state, "42", "dota").await;

        run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();
        let next_day = run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-02"))
            .await
            .unwrap();

        assert_eq!(next_day.attempted, 1);
        assert_eq!(next_day.already_notified, 0);
    }

    #[tokio::test]
    async fn late_registration_gets_exactly_one_send_on_rerun() {
        let harness = harness(&[]);
        seed(&harness.state, "42", "dota").await;

        run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();
        seed(&harness.state, "43", "dota").await;
        let second = run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();

        assert_eq!(second.recipients, 2);
        assert_eq!(second.already_notified, 1);
        assert_eq!(second.attempted, 1);
        assert_eq!(second.outcomes.len(), 1);
        assert_eq!(second.outcomes[0].recipient_id, "43");
    }

    #[tokio::test]
    async fn failed_delivery_is_isolated_and_never_retried() {
        let harness = harness(&["42"]);
        seed(&harness.state, "42", "dota").await;
        seed(&harness.state, "43", "dota").await;

        let first = run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();

        assert_eq!(first.attempted, 2);
        assert_eq!(first.delivered, 1);
        assert_eq!(first.failed, 1);
        assert!(!first.outcomes[0].delivered);
        assert!(first.outcomes[1].delivered);

        let second = run_broadcast(&harness.state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();
        assert_eq!(second.attempted, 0);
        assert_eq!(second.already_notified, 2);
        assert_eq!(harness.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_event_falls_back_to_raw_name_and_placeholder_link() {
        let harness = harness(&[]);
        seed(&harness.state, "42", "quake").await;

        run_broadcast(&harness.state, request(ADMIN, "quake", "2024-06-01"))
            .await
            .unwrap();

        let sent = harness.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("quake"));
        assert!(sent[0].1.contains(FALLBACK_DELIVERY_LINK));
    }

    #[tokio::test]
    async fn unresponsive_transport_counts_as_failure() {
        let attempts: Arc<dyn SnapshotStore<NotificationAttemptEntity>> =
            Arc::new(MemoryStore::new());
        let config = AppConfig {
            send_delay: Duration::ZERO,
            notify_timeout: Duration::from_millis(5),
            ..AppConfig::default()
        };
        let registrations: Arc<dyn SnapshotStore<RegistrationEntity>> =
            Arc::new(MemoryStore::new());
        let state = AppState::new(
            &config,
            registrations,
            attempts,
            Arc::new(DisabledMirror),
            Arc::new(NeverRespondsTransport),
            Arc::new(StaticAdminAuthorizer::new(Some(ADMIN.into()))),
        );
        seed(&state, "42", "dota").await;

        let summary = run_broadcast(&state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap();

        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.delivered, 0);
        assert_eq!(summary.failed, 1);
        assert!(
            state
                .ledger()
                .already_attempted("dota_2024-06-01", "42")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn ledger_write_fault_aborts_the_run() {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let transport = Arc::new(RecordingTransport {
            sent: Arc::clone(&sent),
            fail_for: Vec::new(),
        });
        let state = build_state(transport, Arc::new(ReadOnlyStore));
        seed(&state, "42", "dota").await;
        seed(&state, "43", "dota").await;

        let err = run_broadcast(&state, request(ADMIN, "dota", "2024-06-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Unavailable(_)));
        // The run stopped at the first unpersistable attempt.
        assert_eq!(sent.lock().unwrap().len(), 1);
    }
}
