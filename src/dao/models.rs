use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// One accepted tournament sign-up, persisted in the registrations snapshot.
///
/// Records are append-only: they are created when a submission is accepted and
/// never mutated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationEntity {
    /// Opaque identifier of the participant (VK-style numeric ids arrive as
    /// strings after boundary normalization).
    pub participant_id: String,
    /// Display name supplied by the participant.
    pub participant_name: String,
    /// Identifier of the group (school/club) the participant belongs to.
    pub group_id: String,
    /// Display name of the group.
    pub group_name: String,
    /// Identifier of the event the participant signed up for.
    pub event_id: String,
    /// Display name of the event at submission time.
    pub event_name: String,
    /// Contact phone number supplied with the submission.
    pub phone: String,
    /// Server-side acceptance timestamp.
    pub submitted_at: SystemTime,
}

impl RegistrationEntity {
    /// True when `other` addresses the same (participant, event) identity key.
    ///
    /// Comparison is canonical so records persisted before normalization was
    /// tightened still deduplicate correctly.
    pub fn identity_matches(&self, participant_id: &str, event_id: &str) -> bool {
        canonical_id(&self.participant_id) == canonical_id(participant_id)
            && canonical_id(&self.event_id) == canonical_id(event_id)
    }
}

/// One notification delivery attempt, persisted in the attempts snapshot.
///
/// Append-only; a recorded attempt (successful or not) permanently marks the
/// (campaign, recipient) pair as processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationAttemptEntity {
    /// Campaign the attempt belongs to, see [`campaign_key`].
    pub campaign_key: String,
    /// Participant the notification was addressed to.
    pub recipient_id: String,
    /// Event the campaign targets.
    pub event_id: String,
    /// Date the campaign targets (opaque string, e.g. `2024-06-01`).
    pub target_date: String,
    /// When the delivery was attempted.
    pub attempted_at: SystemTime,
    /// Whether the transport reported the delivery as successful.
    pub succeeded: bool,
}

impl NotificationAttemptEntity {
    /// Build an attempt record for a delivery that just ran.
    pub fn new(event_id: &str, target_date: &str, recipient_id: &str, succeeded: bool) -> Self {
        Self {
            campaign_key: campaign_key(event_id, target_date),
            recipient_id: canonical_id(recipient_id),
            event_id: canonical_id(event_id),
            target_date: canonical_id(target_date),
            attempted_at: SystemTime::now(),
            succeeded,
        }
    }
}

/// Canonical string form of an identifier: surrounding whitespace stripped.
///
/// Numeric-vs-string representation is already collapsed at the wire boundary,
/// so trimming is all that is left to make equality comparisons stable.
pub fn canonical_id(raw: &str) -> String {
    raw.trim().to_owned()
}

/// Key identifying one broadcast campaign: an event occurrence plus the date
/// the broadcast targets.
pub fn campaign_key(event_id: &str, target_date: &str) -> String {
    format!("{}_{}", canonical_id(event_id), canonical_id(target_date))
}

/// RFC3339 rendering of a [`SystemTime`], shared by DTOs and the mirror row.
pub fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
