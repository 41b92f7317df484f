//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::format_system_time, dto::string_or_number, state::CampaignTotals,
};

/// Query carrying the caller identity for admin endpoints.
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub caller_id: String,
}

/// Reply to the admin access probe.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminAccessResponse {
    pub admin: bool,
}

/// Aggregated registration totals for one event.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventStatistics {
    pub event_id: String,
    pub event_name: String,
    pub submissions: usize,
    pub distinct_participants: usize,
}

/// Registration totals across the whole ledger.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResponse {
    pub total_submissions: usize,
    pub distinct_participants: usize,
    pub events: Vec<EventStatistics>,
}

/// Request to run one notification campaign.
///
/// Every field defaults to blank when omitted so the service always gets to
/// run its authorize-then-validate sequence; a typed rejection here would
/// answer 422 before the authorization check.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    /// Caller identity; checked against the configured administrator.
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    pub caller_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    pub event_id: String,
    #[serde(default)]
    pub target_date: String,
}

/// Outcome of one delivery inside a broadcast run.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecipientOutcome {
    pub recipient_id: String,
    pub delivered: bool,
}

/// Totals returned once a broadcast run finishes.
#[derive(Debug, Serialize, ToSchema)]
pub struct BroadcastResponse {
    pub campaign_key: String,
    /// Distinct registered recipients for the event.
    pub recipients: usize,
    /// Recipients skipped because an attempt was already on ledger.
    pub already_notified: usize,
    /// Recipients targeted by this run.
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub outcomes: Vec<RecipientOutcome>,
}

/// One campaign occurrence with its delivery totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignSummary {
    pub campaign_key: String,
    pub event_id: String,
    pub target_date: String,
    pub total: usize,
    pub successful: usize,
    pub first_attempt: String,
}

/// Campaign history, most recent first.
#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignHistoryResponse {
    pub campaigns: Vec<CampaignSummary>,
}

/// Result of pushing a probe row at the mirror sink.
#[derive(Debug, Serialize, ToSchema)]
pub struct MirrorTestResponse {
    pub ok: bool,
    pub message: String,
}

impl From<CampaignTotals> for CampaignSummary {
    fn from(totals: CampaignTotals) -> Self {
        Self {
            campaign_key: totals.campaign_key,
            event_id: totals.event_id,
            target_date: totals.target_date,
            total: totals.total,
            successful: totals.successful,
            first_attempt: format_system_time(totals.first_attempt),
        }
    }
}
