use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::admin::{
        AdminAccessResponse, AdminQuery, BroadcastRequest, BroadcastResponse,
        CampaignHistoryResponse, MirrorTestResponse, StatisticsResponse,
    },
    error::AppError,
    services::{admin_service, broadcast_service},
    state::SharedState,
};

/// Administrator endpoints: statistics, campaigns and operational probes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/access", get(admin_access))
        .route("/admin/statistics", get(statistics))
        .route("/admin/broadcasts", post(run_broadcast).get(campaign_history))
        .route("/admin/mirror/test", post(test_mirror))
}

/// Tell whether the caller holds the administrator identity.
#[utoipa::path(
    get,
    path = "/admin/access",
    tag = "admin",
    params(("caller_id" = String, Query, description = "Identity of the caller")),
    responses((status = 200, description = "Access flag", body = AdminAccessResponse))
)]
pub async fn admin_access(
    State(state): State<SharedState>,
    Query(query): Query<AdminQuery>,
) -> Json<AdminAccessResponse> {
    Json(admin_service::check_admin_access(&state, &query.caller_id))
}

/// Aggregate registration totals across the ledger.
#[utoipa::path(
    get,
    path = "/admin/statistics",
    tag = "admin",
    params(("caller_id" = String, Query, description = "Identity of the caller")),
    responses(
        (status = 200, description = "Registration statistics", body = StatisticsResponse),
        (status = 403, description = "Caller is not the administrator")
    )
)]
pub async fn statistics(
    State(state): State<SharedState>,
    Query(query): Query<AdminQuery>,
) -> Result<Json<StatisticsResponse>, AppError> {
    Ok(Json(
        admin_service::get_statistics(&state, &query.caller_id).await?,
    ))
}

/// Run one notification campaign for an event occurrence.
#[utoipa::path(
    post,
    path = "/admin/broadcasts",
    tag = "admin",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Broadcast summary", body = BroadcastResponse),
        (status = 400, description = "Missing event or target date"),
        (status = 403, description = "Caller is not the administrator")
    )
)]
pub async fn run_broadcast(
    State(state): State<SharedState>,
    Json(payload): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>, AppError> {
    Ok(Json(
        broadcast_service::run_broadcast(&state, payload).await?,
    ))
}

/// List past campaigns with their delivery totals, most recent first.
#[utoipa::path(
    get,
    path = "/admin/broadcasts",
    tag = "admin",
    params(("caller_id" = String, Query, description = "Identity of the caller")),
    responses(
        (status = 200, description = "Campaign history", body = CampaignHistoryResponse),
        (status = 403, description = "Caller is not the administrator")
    )
)]
pub async fn campaign_history(
    State(state): State<SharedState>,
    Query(query): Query<AdminQuery>,
) -> Result<Json<CampaignHistoryResponse>, AppError> {
    Ok(Json(
        admin_service::get_campaign_history(&state, &query.caller_id).await?,
    ))
}

/// Push a probe row at the mirror sink to verify the wiring.
#[utoipa::path(
    post,
    path = "/admin/mirror/test",
    tag = "admin",
    params(("caller_id" = String, Query, description = "Identity of the caller")),
    responses(
        (status = 200, description = "Probe outcome", body = MirrorTestResponse),
        (status = 403, description = "Caller is not the administrator")
    )
)]
pub async fn test_mirror(
    State(state): State<SharedState>,
    Query(query): Query<AdminQuery>,
) -> Result<Json<MirrorTestResponse>, AppError> {
    Ok(Json(
        admin_service::test_mirror(&state, &query.caller_id).await?,
    ))
}
