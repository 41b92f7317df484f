//! HTTP webhook transport: posts one `{ recipient_id, message }` document per
//! delivery to the configured push endpoint.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Serialize;

use crate::dao::notifier::{DeliveryError, NotificationTransport};

/// Connection settings for the push webhook.
#[derive(Debug, Clone)]
pub struct PushWebhookConfig {
    /// Endpoint receiving delivery requests.
    pub url: String,
    /// Optional bearer token attached to every request.
    pub token: Option<String>,
}

/// Body posted for each delivery.
#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    recipient_id: &'a str,
    message: &'a str,
}

/// Notification transport delivering through an HTTP webhook.
pub struct PushWebhookTransport {
    client: Client,
    config: Arc<PushWebhookConfig>,
}

impl PushWebhookTransport {
    /// Build the transport and its HTTP client.
    pub fn new(config: PushWebhookConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .build()
            .map_err(|source| DeliveryError::transport("building push client".into(), source))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }
}

impl NotificationTransport for PushWebhookTransport {
    fn notify(
        &self,
        recipient_id: String,
        message: String,
    ) -> BoxFuture<'static, Result<(), DeliveryError>> {
        let client = self.client.clone();
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            let payload = PushPayload {
                recipient_id: &recipient_id,
                message: &message,
            };

            let mut builder = client.post(&config.url).json(&payload);
            if let Some(token) = &config.token {
                builder = builder.bearer_auth(token);
            }

            let response = builder.send().await.map_err(|source| {
                DeliveryError::transport(
                    format!("posting notification to `{}`", config.url),
                    source,
                )
            })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(DeliveryError::Rejected {
                    status: response.status().as_u16(),
                })
            }
        })
    }
}
