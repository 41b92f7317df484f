//! Intake of sign-up submissions and the read-only participation queries.

use std::time::SystemTime;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    dao::models::{RegistrationEntity, canonical_id},
    dto::registration::{
        ApplicationSummary, ApplicationsResponse, ParticipantEventsResponse, ParticipationResponse,
        RegistrationStatus, SubmitRegistrationRequest, SubmitRegistrationResponse,
    },
    error::ServiceError,
    state::{InsertOutcome, SharedState},
};

/// Accept a submission, mirror it on success and report the outcome.
///
/// The local record is the source of truth: a mirror fault downgrades the
/// response to `mirrored: false` but never rolls the registration back.
pub async fn submit_registration(
    state: &SharedState,
    payload: SubmitRegistrationRequest,
) -> Result<SubmitRegistrationResponse, ServiceError> {
    let record = RegistrationEntity {
        participant_id: canonical_id(&payload.participant_id),
        participant_name: payload.participant_name.trim().to_owned(),
        group_id: canonical_id(&payload.group_id),
        group_name: payload.group_name.trim().to_owned(),
        event_id: canonical_id(&payload.event_id),
        event_name: payload.event_name.trim().to_owned(),
        phone: payload.phone.trim().to_owned(),
        submitted_at: SystemTime::now(),
    };

    if state.registry().insert(record.clone()).await? == InsertOutcome::Duplicate {
        info!(
            participant = %record.participant_id,
            event = %record.event_id,
            "submission ignored, pair already registered"
        );
        return Ok(SubmitRegistrationResponse {
            status: RegistrationStatus::Duplicate,
            mirrored: false,
        });
    }

    let append = state.mirror().mirror(record.clone());
    let mirrored = match timeout(state.notify_timeout(), append).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            warn!(
                participant = %record.participant_id,
                event = %record.event_id,
                error = %err,
                "mirror append failed; registration kept locally"
            );
            false
        }
        Err(_) => {
            warn!(
                participant = %record.participant_id,
                event = %record.event_id,
                "mirror append timed out; registration kept locally"
            );
            false
        }
    };

    info!(
        participant = %record.participant_id,
        event = %record.event_id,
        mirrored,
        "registration accepted"
    );
    Ok(SubmitRegistrationResponse {
        status: RegistrationStatus::Accepted,
        mirrored,
    })
}

/// Tell whether the exact (participant, event) pair is already registered.
pub async fn check_participation(
    state: &SharedState,
    participant_id: &str,
    event_id: &str,
) -> Result<ParticipationResponse, ServiceError> {
    let registered = state.registry().exists(participant_id, event_id).await?;
    Ok(ParticipationResponse { registered })
}

/// Events one participant has signed up for, in submission order.
pub async fn participant_events(
    state: &SharedState,
    participant_id: &str,
) -> Result<ParticipantEventsResponse, ServiceError> {
    let records = state.registry().find_by_participant(participant_id).await?;
    Ok(ParticipantEventsResponse {
        participant_id: canonical_id(participant_id),
        event_ids: records.into_iter().map(|record| record.event_id).collect(),
    })
}

/// Full application history of one participant.
pub async fn participant_applications(
    state: &SharedState,
    participant_id: &str,
) -> Result<ApplicationsResponse, ServiceError> {
    let records = state.registry().find_by_participant(participant_id).await?;
    Ok(ApplicationsResponse {
        applications: records.into_iter().map(ApplicationSummary::from).collect(),
    })
}
