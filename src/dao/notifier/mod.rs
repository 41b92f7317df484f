#[cfg(feature = "webhook-sinks")]
pub mod webhook;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

/// Outbound push-notification capability consumed by the broadcast engine.
///
/// The engine treats every send as independent: a failed delivery is recorded
/// in the notification ledger and the run continues with the next recipient.
pub trait NotificationTransport: Send + Sync {
    /// Deliver `message` to the given participant.
    fn notify(
        &self,
        recipient_id: String,
        message: String,
    ) -> BoxFuture<'static, Result<(), DeliveryError>>;
}

/// Failure modes of a single delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No transport is configured for this deployment.
    #[error("notification transport disabled: no webhook configured")]
    Disabled,
    /// The transport could not be reached or the request could not be built.
    #[error("notification transport failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The transport answered with a non-success status.
    #[error("notification rejected (status {status})")]
    Rejected { status: u16 },
}

impl DeliveryError {
    /// Wrap an arbitrary transport failure.
    pub fn transport(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        DeliveryError::Transport {
            message,
            source: Box::new(source),
        }
    }
}

/// Transport used when no push webhook is configured. Broadcasts still run
/// and record their attempts, but every delivery fails and is logged as a
/// failed attempt.
pub struct DisabledTransport;

impl NotificationTransport for DisabledTransport {
    fn notify(
        &self,
        _recipient_id: String,
        _message: String,
    ) -> BoxFuture<'static, Result<(), DeliveryError>> {
        Box::pin(async { Err(DeliveryError::Disabled) })
    }
}
