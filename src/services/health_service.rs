use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a health payload after probing both snapshot stores.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let mut healthy = true;

    if let Err(err) = state.registry().health_check().await {
        warn!(error = %err, "registrations snapshot health check failed");
        healthy = false;
    }
    if let Err(err) = state.ledger().health_check().await {
        warn!(error = %err, "attempts snapshot health check failed");
        healthy = false;
    }

    if healthy {
        HealthResponse::ok()
    } else {
        HealthResponse::degraded()
    }
}
