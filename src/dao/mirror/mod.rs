#[cfg(feature = "webhook-sinks")]
pub mod webhook;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::models::RegistrationEntity;

/// Best-effort replication of accepted registrations to an external
/// spreadsheet-like sink.
///
/// Mirroring is fire-and-forget from the ledger's point of view: a failure
/// here never rolls back a locally accepted registration, it only flips the
/// `mirrored` flag in the submit response.
pub trait MirrorSink: Send + Sync {
    /// Append one accepted registration to the external sink.
    fn mirror(&self, record: RegistrationEntity) -> BoxFuture<'static, Result<(), MirrorError>>;
}

/// Failure modes of the mirror sink.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// No sink is configured for this deployment.
    #[error("mirroring disabled: no webhook configured")]
    Disabled,
    /// The sink could not be reached or the request could not be built.
    #[error("mirror transport failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The sink answered with a non-success status.
    #[error("mirror rejected the row (status {status})")]
    Rejected { status: u16 },
}

impl MirrorError {
    /// Wrap an arbitrary transport failure.
    pub fn transport(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        MirrorError::Transport {
            message,
            source: Box::new(source),
        }
    }
}

/// Sink used when no mirror webhook is configured; every call reports the
/// mirror as unavailable so responses disclose `mirrored: false`.
pub struct DisabledMirror;

impl MirrorSink for DisabledMirror {
    fn mirror(&self, _record: RegistrationEntity) -> BoxFuture<'static, Result<(), MirrorError>> {
        Box::pin(async { Err(MirrorError::Disabled) })
    }
}
