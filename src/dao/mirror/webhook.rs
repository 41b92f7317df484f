//! HTTP webhook mirror: posts each accepted registration as one tabular row,
//! matching the column layout of the upstream spreadsheet.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::json;

use crate::dao::{
    mirror::{MirrorError, MirrorSink},
    models::{RegistrationEntity, format_system_time},
};

/// Connection settings for the row webhook.
#[derive(Debug, Clone)]
pub struct MirrorWebhookConfig {
    /// Endpoint receiving `{ "values": [[...]] }` append requests.
    pub url: String,
    /// Optional bearer token attached to every request.
    pub token: Option<String>,
}

/// Mirror sink appending rows to a spreadsheet webhook.
pub struct RowWebhookMirror {
    client: Client,
    config: Arc<MirrorWebhookConfig>,
}

impl RowWebhookMirror {
    /// Build the sink and its HTTP client.
    pub fn new(config: MirrorWebhookConfig) -> Result<Self, MirrorError> {
        let client = Client::builder()
            .build()
            .map_err(|source| MirrorError::transport("building mirror client".into(), source))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }
}

impl MirrorSink for RowWebhookMirror {
    fn mirror(&self, record: RegistrationEntity) -> BoxFuture<'static, Result<(), MirrorError>> {
        let client = self.client.clone();
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let payload = json!({ "values": [mirror_row(&record)] });

            let mut builder = client.post(&config.url).json(&payload);
            if let Some(token) = &config.token {
                builder = builder.bearer_auth(token);
            }

            let response = builder.send().await.map_err(|source| {
                MirrorError::transport(format!("posting row to `{}`", config.url), source)
            })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(MirrorError::Rejected {
                    status: response.status().as_u16(),
                })
            }
        })
    }
}

/// Flatten a registration into the sheet's column order.
fn mirror_row(record: &RegistrationEntity) -> Vec<String> {
    vec![
        record.participant_id.clone(),
        record.participant_name.clone(),
        record.group_id.clone(),
        record.group_name.clone(),
        record.event_id.clone(),
        record.event_name.clone(),
        record.phone.clone(),
        format_system_time(record.submitted_at),
    ]
}
