pub mod ledger;
pub mod registry;

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    config::{AppConfig, EventCatalog},
    dao::{
        mirror::MirrorSink,
        models::{NotificationAttemptEntity, RegistrationEntity},
        notifier::NotificationTransport,
        snapshot::SnapshotStore,
    },
    services::auth::AdminAuthorizer,
};

pub use self::ledger::{CampaignTotals, NotificationLedger};
pub use self::registry::{InsertOutcome, RegistrationRegistry};

pub type SharedState = Arc<AppState>;

/// Central application state storing the durable ledgers and the outbound
/// gateways.
pub struct AppState {
    registry: RegistrationRegistry,
    ledger: NotificationLedger,
    mirror: Arc<dyn MirrorSink>,
    transport: Arc<dyn NotificationTransport>,
    authorizer: Arc<dyn AdminAuthorizer>,
    events: EventCatalog,
    send_delay: Duration,
    notify_timeout: Duration,
    broadcast_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply.
    pub fn new(
        config: &AppConfig,
        registrations: Arc<dyn SnapshotStore<RegistrationEntity>>,
        attempts: Arc<dyn SnapshotStore<NotificationAttemptEntity>>,
        mirror: Arc<dyn MirrorSink>,
        transport: Arc<dyn NotificationTransport>,
        authorizer: Arc<dyn AdminAuthorizer>,
    ) -> SharedState {
        Arc::new(Self {
            registry: RegistrationRegistry::new(registrations),
            ledger: NotificationLedger::new(attempts),
            mirror,
            transport,
            authorizer,
            events: config.events.clone(),
            send_delay: config.send_delay,
            notify_timeout: config.notify_timeout,
            broadcast_gate: Mutex::new(()),
        })
    }

    /// Durable ledger of registration records.
    pub fn registry(&self) -> &RegistrationRegistry {
        &self.registry
    }

    /// Durable ledger of notification attempts.
    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    /// Gateway mirroring accepted records to the external sheet.
    pub fn mirror(&self) -> Arc<dyn MirrorSink> {
        Arc::clone(&self.mirror)
    }

    /// Gateway delivering campaign messages to recipients.
    pub fn transport(&self) -> Arc<dyn NotificationTransport> {
        Arc::clone(&self.transport)
    }

    /// Authority deciding which callers may use admin operations.
    pub fn authorizer(&self) -> &dyn AdminAuthorizer {
        self.authorizer.as_ref()
    }

    /// Catalog of known events with display names and delivery links.
    pub fn events(&self) -> &EventCatalog {
        &self.events
    }

    /// Pause inserted between consecutive deliveries of a campaign.
    pub fn send_delay(&self) -> Duration {
        self.send_delay
    }

    /// Upper bound on a single outbound webhook call.
    pub fn notify_timeout(&self) -> Duration {
        self.notify_timeout
    }

    /// Gate serializing campaign runs so at most one broadcast is in flight.
    pub fn broadcast_gate(&self) -> &Mutex<()> {
        &self.broadcast_gate
    }
}
