use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Arena Signup Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::registration::submit_registration,
        crate::routes::registration::check_participation,
        crate::routes::registration::participant_events,
        crate::routes::registration::participant_applications,
        crate::routes::admin::admin_access,
        crate::routes::admin::statistics,
        crate::routes::admin::run_broadcast,
        crate::routes::admin::campaign_history,
        crate::routes::admin::test_mirror,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::registration::SubmitRegistrationRequest,
            crate::dto::registration::SubmitRegistrationResponse,
            crate::dto::registration::RegistrationStatus,
            crate::dto::registration::ParticipationResponse,
            crate::dto::registration::ParticipantEventsResponse,
            crate::dto::registration::ApplicationsResponse,
            crate::dto::registration::ApplicationSummary,
            crate::dto::admin::AdminAccessResponse,
            crate::dto::admin::StatisticsResponse,
            crate::dto::admin::EventStatistics,
            crate::dto::admin::BroadcastRequest,
            crate::dto::admin::BroadcastResponse,
            crate::dto::admin::RecipientOutcome,
            crate::dto::admin::CampaignHistoryResponse,
            crate::dto::admin::CampaignSummary,
            crate::dto::admin::MirrorTestResponse,
        )
    ),
    tags(
        (name = "registration", description = "Sign-up submissions and participation queries"),
        (name = "admin", description = "Administrator statistics and notification campaigns"),
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
