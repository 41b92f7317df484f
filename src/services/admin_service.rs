//! Read-only administrator aggregates and operational probes.

use std::{collections::HashSet, time::SystemTime};

use indexmap::IndexMap;
use tokio::time::timeout;
use tracing::info;

use crate::{
    dao::models::{RegistrationEntity, canonical_id},
    dto::admin::{
        AdminAccessResponse, CampaignHistoryResponse, CampaignSummary, EventStatistics,
        MirrorTestResponse, StatisticsResponse,
    },
    error::ServiceError,
    state::SharedState,
};

/// Tell whether the caller holds the administrator identity.
pub fn check_admin_access(state: &SharedState, caller_id: &str) -> AdminAccessResponse {
    AdminAccessResponse {
        admin: state.authorizer().is_authorized(caller_id),
    }
}

/// Aggregate registration totals across the ledger; administrator only.
pub async fn get_statistics(
    state: &SharedState,
    caller_id: &str,
) -> Result<StatisticsResponse, ServiceError> {
    authorize(state, caller_id)?;

    let records = state.registry().list_all().await?;

    let mut global_participants: HashSet<String> = HashSet::new();
    let mut per_event: IndexMap<String, EventBucket> = IndexMap::new();
    for record in &records {
        let participant = canonical_id(&record.participant_id);
        global_participants.insert(participant.clone());

        let event_id = canonical_id(&record.event_id);
        let bucket = per_event.entry(event_id.clone()).or_insert_with(|| {
            // Catalog name when the event is known, the name stored with the
            // first record otherwise.
            let event_name = state
                .events()
                .known_name(&event_id)
                .unwrap_or_else(|| record.event_name.clone());
            EventBucket {
                event_name,
                submissions: 0,
                participants: HashSet::new(),
            }
        });
        bucket.submissions += 1;
        bucket.participants.insert(participant);
    }

    let events = per_event
        .into_iter()
        .map(|(event_id, bucket)| EventStatistics {
            event_id,
            event_name: bucket.event_name,
            submissions: bucket.submissions,
            distinct_participants: bucket.participants.len(),
        })
        .collect();

    Ok(StatisticsResponse {
        total_submissions: records.len(),
        distinct_participants: global_participants.len(),
        events,
    })
}

/// Campaign history with delivery totals, most recent first; administrator
/// only.
pub async fn get_campaign_history(
    state: &SharedState,
    caller_id: &str,
) -> Result<CampaignHistoryResponse, ServiceError> {
    authorize(state, caller_id)?;

    let campaigns = state
        .ledger()
        .all_campaign_summaries()
        .await?
        .into_iter()
        .map(CampaignSummary::from)
        .collect();
    Ok(CampaignHistoryResponse { campaigns })
}

/// Push a probe row at the mirror sink to verify wiring; administrator only.
///
/// A failing sink is reported in the response body, not as an error status.
pub async fn test_mirror(
    state: &SharedState,
    caller_id: &str,
) -> Result<MirrorTestResponse, ServiceError> {
    authorize(state, caller_id)?;

    let probe = RegistrationEntity {
        participant_id: "probe".into(),
        participant_name: "Connectivity probe".into(),
        group_id: "0".into(),
        group_name: "Probe".into(),
        event_id: "probe".into(),
        event_name: "Mirror probe".into(),
        phone: "+00000000000".into(),
        submitted_at: SystemTime::now(),
    };

    match timeout(state.notify_timeout(), state.mirror().mirror(probe)).await {
        Ok(Ok(())) => {
            info!("mirror probe row accepted");
            Ok(MirrorTestResponse {
                ok: true,
                message: "mirror sink accepted the probe row".into(),
            })
        }
        Ok(Err(err)) => Ok(MirrorTestResponse {
            ok: false,
            message: err.to_string(),
        }),
        Err(_) => Ok(MirrorTestResponse {
            ok: false,
            message: "mirror probe timed out".into(),
        }),
    }
}

struct EventBucket {
    event_name: String,
    submissions: usize,
    participants: HashSet<String>,
}

fn authorize(state: &SharedState, caller_id: &str) -> Result<(), ServiceError> {
    if state.authorizer().is_authorized(caller_id) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "administrator identity required".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::{
            mirror::DisabledMirror,
            models::NotificationAttemptEntity,
            notifier::DisabledTransport,
            snapshot::{SnapshotStore, memory::MemoryStore},
        },
        services::auth::StaticAdminAuthorizer,
        state::AppState,
    };

    const ADMIN: &str = "100500";

    fn state() -> SharedState {
        let registrations: Arc<dyn SnapshotStore<RegistrationEntity>> =
            Arc::new(MemoryStore::new());
        let attempts: Arc<dyn SnapshotStore<NotificationAttemptEntity>> =
            Arc::new(MemoryStore::new());
        AppState::new(
            &AppConfig::default(),
            registrations,
            attempts,
            Arc::new(DisabledMirror),
            Arc::new(DisabledTransport),
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
            event_name: "Stored Name".into(),
            phone: "+70000000000".into(),
            submitted_at: SystemTime::UNIX_EPOCH,
        };
        state.registry().insert(record).await.unwrap();
    }

    #[tokio::test]
    async fn access_probe_distinguishes_the_administrator() {
        let state = state();
        assert!(check_admin_access(&state, ADMIN).admin);
        assert!(check_admin_access(&state, " 100500 ").admin);
        assert!(!check_admin_access(&state, "999").admin);
    }

    #[tokio::test]
    async fn statistics_are_admin_only() {
        let state = state();
        let err = get_statistics(&state, "999").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn statistics_count_submissions_and_distinct_participants() {
        let state = state();
        seed(&state, "42", "dota").await;
        seed(&state, "43", "dota").await;
        seed(&state, "42", "cs2").await;
        seed(&state, "44", "quake").await;

        let stats = get_statistics(&state, ADMIN).await.unwrap();

        assert_eq!(stats.total_submissions, 4);
        assert_eq!(stats.distinct_participants, 3);
        assert_eq!(stats.events.len(), 3);

        let dota = &stats.events[0];
        assert_eq!(dota.event_id, "dota");
        assert_eq!(dota.event_name, "Dota 2");
        assert_eq!(dota.submissions, 2);
        assert_eq!(dota.distinct_participants, 2);

        // Not in the catalog: the stored name wins over the raw id.
        let quake = &stats.events[2];
        assert_eq!(quake.event_id, "quake");
        assert_eq!(quake.event_name, "Stored Name");
    }

    #[tokio::test]
    async fn campaign_history_is_admin_only_and_ordered() {
        let state = state();

        let mut early = NotificationAttemptEntity::new("dota", "2024-06-01", "42", true);
        early.attempted_at = SystemTime::UNIX_EPOCH;
        state.ledger().record_attempt(early).await.unwrap();
        state
            .ledger()
            .record_attempt(NotificationAttemptEntity::new(
                "cs2",
                "2024-06-02",
                "43",
                false,
            ))
            .await
            .unwrap();

        let err = get_campaign_history(&state, "999").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let history = get_campaign_history(&state, ADMIN).await.unwrap();
        assert_eq!(history.campaigns.len(), 2);
        assert_eq!(history.campaigns[0].campaign_key, "cs2_2024-06-02");
        assert_eq!(history.campaigns[0].successful, 0);
        assert_eq!(history.campaigns[1].campaign_key, "dota_2024-06-01");
        assert_eq!(history.campaigns[1].successful, 1);
    }

    #[tokio::test]
    async fn mirror_probe_reports_sink_failures_in_the_body() {
        let state = state();

        let err = test_mirror(&state, "999").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        // DisabledMirror always refuses; the probe must surface that ok=false.
        let probe = test_mirror(&state, ADMIN).await.unwrap();
        assert!(!probe.ok);
        assert!(probe.message.contains("disabled"));
    }
}
