use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::registration::{
        ApplicationsResponse, ParticipantEventsResponse, ParticipationQuery,
        ParticipationResponse, SubmitRegistrationRequest, SubmitRegistrationResponse,
    },
    error::AppError,
    services::registration_service,
    state::SharedState,
};

/// Routes handling sign-up submissions and participation queries.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/registrations", post(submit_registration))
        .route("/participation", get(check_participation))
        .route("/participants/{id}/events", get(participant_events))
        .route(
            "/participants/{id}/applications",
            get(participant_applications),
        )
}

/// Accept a sign-up submission and mirror it to the configured sheet.
#[utoipa::path(
    post,
    path = "/registrations",
    tag = "registration",
    request_body = SubmitRegistrationRequest,
    responses(
        (status = 200, description = "Submission processed", body = SubmitRegistrationResponse),
        (status = 400, description = "Missing or malformed fields")
    )
)]
pub async fn submit_registration(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SubmitRegistrationRequest>>,
) -> Result<Json<SubmitRegistrationResponse>, AppError> {
    Ok(Json(
        registration_service::submit_registration(&state, payload).await?,
    ))
}

/// Tell whether the exact (participant, event) pair is already registered.
#[utoipa::path(
    get,
    path = "/participation",
    tag = "registration",
    params(
        ("participant_id" = String, Query, description = "Participant identifier"),
        ("event_id" = String, Query, description = "Event identifier")
    ),
    responses((status = 200, description = "Participation flag", body = ParticipationResponse))
)]
pub async fn check_participation(
    State(state): State<SharedState>,
    Query(query): Query<ParticipationQuery>,
) -> Result<Json<ParticipationResponse>, AppError> {
    Ok(Json(
        registration_service::check_participation(&state, &query.participant_id, &query.event_id)
            .await?,
    ))
}

/// List the events one participant has signed up for.
#[utoipa::path(
    get,
    path = "/participants/{id}/events",
    tag = "registration",
    params(("id" = String, Path, description = "Participant identifier")),
    responses((status = 200, description = "Signed-up events", body = ParticipantEventsResponse))
)]
pub async fn participant_events(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ParticipantEventsResponse>, AppError> {
    Ok(Json(
        registration_service::participant_events(&state, &id).await?,
    ))
}

/// List the full application history of one participant.
#[utoipa::path(
    get,
    path = "/participants/{id}/applications",
    tag = "registration",
    params(("id" = String, Path, description = "Participant identifier")),
    responses((status = 200, description = "Application history", body = ApplicationsResponse))
)]
pub async fn participant_applications(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationsResponse>, AppError> {
    Ok(Json(
        registration_service::participant_applications(&state, &id).await?,
    ))
}
