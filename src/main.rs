//! Arena Signup Back binary entrypoint wiring REST, snapshot storage, and webhook sinks.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use config::AppConfig;
use dao::mirror::{DisabledMirror, MirrorSink};
#[cfg(feature = "webhook-sinks")]
use dao::mirror::webhook::{MirrorWebhookConfig, RowWebhookMirror};
use dao::models::{NotificationAttemptEntity, RegistrationEntity};
use dao::notifier::{DisabledTransport, NotificationTransport};
#[cfg(feature = "webhook-sinks")]
use dao::notifier::webhook::{PushWebhookConfig, PushWebhookTransport};
use dao::snapshot::{SnapshotStore, json_file::JsonFileStore};
use services::auth::StaticAdminAuthorizer;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("creating data directory {}", config.data_dir.display()))?;

    let registrations: Arc<dyn SnapshotStore<RegistrationEntity>> =
        Arc::new(JsonFileStore::new(config.data_dir.join("registrations.json")));
    let attempts: Arc<dyn SnapshotStore<NotificationAttemptEntity>> = Arc::new(
        JsonFileStore::new(config.data_dir.join("notification_attempts.json")),
    );

    let mirror = build_mirror(&config)?;
    let transport = build_transport(&config)?;
    let authorizer = Arc::new(StaticAdminAuthorizer::new(config.admin_id.clone()));

    let app_state = AppState::new(
        &config,
        registrations,
        attempts,
        mirror,
        transport,
        authorizer,
    );

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Construct the spreadsheet mirror sink, falling back to the disabled sink
/// when no webhook is configured.
fn build_mirror(config: &AppConfig) -> anyhow::Result<Arc<dyn MirrorSink>> {
    #[cfg(feature = "webhook-sinks")]
    if let Some(settings) = &config.mirror {
        let sink = RowWebhookMirror::new(MirrorWebhookConfig {
            url: settings.url.clone(),
            token: settings.token.clone(),
        })
        .context("building mirror webhook client")?;
        info!(url = %settings.url, "mirroring accepted registrations to webhook");
        return Ok(Arc::new(sink));
    }

    #[cfg(not(feature = "webhook-sinks"))]
    if config.mirror.is_some() {
        tracing::warn!("mirror webhook configured but webhook sinks are compiled out");
    }

    info!("no mirror webhook configured; registrations stay local only");
    Ok(Arc::new(DisabledMirror))
}

/// Construct the push-notification transport, falling back to the disabled
/// transport when no webhook is configured.
fn build_transport(config: &AppConfig) -> anyhow::Result<Arc<dyn NotificationTransport>> {
    #[cfg(feature = "webhook-sinks")]
    if let Some(settings) = &config.notify {
        let transport = PushWebhookTransport::new(PushWebhookConfig {
            url: settings.url.clone(),
            token: settings.token.clone(),
        })
        .context("building notification webhook client")?;
        info!(url = %settings.url, "delivering notifications through webhook");
        return Ok(Arc::new(transport));
    }

    #[cfg(not(feature = "webhook-sinks"))]
    if config.notify.is_some() {
        tracing::warn!("notification webhook configured but webhook sinks are compiled out");
    }

    info!("no notification webhook configured; broadcast deliveries will fail");
    Ok(Arc::new(DisabledTransport))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
