//! DTO definitions for the public registration API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{RegistrationEntity, format_system_time},
    dto::{
        string_or_number,
        validation::{validate_identifier, validate_phone},
    },
};

/// Payload submitted when a participant signs up for an event.
///
/// Omitted fields deserialize blank and are rejected by validation, so a
/// sparse body answers 400 like a blank one instead of dying in the
/// extractor with 422.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitRegistrationRequest {
    /// Participant identifier; numeric payloads are folded into strings.
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    #[validate(custom(function = validate_identifier))]
    pub participant_id: String,
    #[serde(default)]
    #[validate(custom(function = validate_identifier))]
    pub participant_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    #[validate(custom(function = validate_identifier))]
    pub group_id: String,
    #[serde(default)]
    #[validate(custom(function = validate_identifier))]
    pub group_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    #[validate(custom(function = validate_identifier))]
    pub event_id: String,
    #[serde(default)]
    #[validate(custom(function = validate_identifier))]
    pub event_name: String,
    #[serde(default)]
    #[validate(custom(function = validate_phone))]
    pub phone: String,
}

/// Whether a submission created a record or hit an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Accepted,
    Duplicate,
}

/// Outcome of a submission, disclosing mirror delivery status.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitRegistrationResponse {
    pub status: RegistrationStatus,
    pub mirrored: bool,
}

/// Query selecting one (participant, event) pair.
#[derive(Debug, Deserialize)]
pub struct ParticipationQuery {
    pub participant_id: String,
    pub event_id: String,
}

/// Reply to the participation probe.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipationResponse {
    pub registered: bool,
}

/// Events a participant has signed up for.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantEventsResponse {
    pub participant_id: String,
    pub event_ids: Vec<String>,
}

/// One earlier application of a participant.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicationSummary {
    pub event_id: String,
    pub event_name: String,
    pub group_name: String,
    pub submitted_at: String,
}

/// Every application a participant has submitted so far.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicationsResponse {
    pub applications: Vec<ApplicationSummary>,
}

impl From<RegistrationEntity> for ApplicationSummary {
    fn from(record: RegistrationEntity) -> Self {
        Self {
            event_id: record.event_id,
            event_name: record.event_name,
            group_name: record.group_name,
            submitted_at: format_system_time(record.submitted_at),
        }
    }
}
