//! Application-level configuration loading, including the runtime event catalog.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ARENA_CONFIG_PATH";
/// Default directory holding the snapshot files.
const DEFAULT_DATA_DIR: &str = "data";
/// Pause inserted between two consecutive notification sends.
const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(200);
/// Upper bound for a single outbound webhook call before it counts as failed.
const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);
/// Link offered when an event has no configured delivery link.
pub const FALLBACK_DELIVERY_LINK: &str = "https://arena-signup.example/games";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Identity allowed to run administrator operations; `None` means nobody.
    pub admin_id: Option<String>,
    /// Directory holding the registrations and notification-attempts snapshots.
    pub data_dir: PathBuf,
    /// Inter-send delay of the broadcast engine.
    pub send_delay: Duration,
    /// Per-call timeout for outbound deliveries and mirror appends.
    pub notify_timeout: Duration,
    /// Spreadsheet mirror webhook; `None` disables mirroring.
    pub mirror: Option<WebhookSettings>,
    /// Push-notification webhook; `None` disables deliveries.
    pub notify: Option<WebhookSettings>,
    /// Event catalog used for display names and delivery links.
    pub events: EventCatalog,
}

/// URL plus optional bearer token of an outbound webhook.
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    /// Endpoint receiving the webhook requests.
    pub url: String,
    /// Bearer token attached to every request, when set.
    pub token: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in
    /// defaults, then apply environment overrides on top.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        events = config.events.len(),
                        "loaded configuration file"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.apply_env_overrides();

        if config.admin_id.is_none() {
            warn!("no administrator identity configured; admin operations are disabled");
        }

        config
    }

    fn apply_env_overrides(&mut self) {
        if let Some(admin) = env_string("ARENA_ADMIN_ID") {
            self.admin_id = Some(admin);
        }
        if let Some(dir) = env_string("ARENA_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(delay) = env_duration_ms("ARENA_SEND_DELAY_MS") {
            self.send_delay = delay;
        }
        if let Some(timeout) = env_duration_ms("ARENA_NOTIFY_TIMEOUT_MS") {
            self.notify_timeout = timeout;
        }
        if let Some(url) = env_string("ARENA_MIRROR_URL") {
            self.mirror = Some(WebhookSettings {
                url,
                token: env_string("ARENA_MIRROR_TOKEN"),
            });
        }
        if let Some(url) = env_string("ARENA_NOTIFY_URL") {
            self.notify = Some(WebhookSettings {
                url,
                token: env_string("ARENA_NOTIFY_TOKEN"),
            });
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_id: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            send_delay: DEFAULT_SEND_DELAY,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            mirror: None,
            notify: None,
            events: EventCatalog::built_in(),
        }
    }
}

/// Lookup table mapping event identifiers to their display metadata.
///
/// Unknown identifiers never fail: the display name falls back to the raw
/// identifier and the delivery link to [`FALLBACK_DELIVERY_LINK`].
#[derive(Debug, Clone)]
pub struct EventCatalog {
    entries: IndexMap<String, EventEntry>,
}

/// Display metadata of a single event.
#[derive(Debug, Clone)]
pub struct EventEntry {
    /// Human-readable event name.
    pub name: String,
    /// Link participants follow to join the event, when configured.
    pub link: Option<String>,
}

impl EventCatalog {
    /// Catalog shipped with the binary, used when no config file lists events.
    pub fn built_in() -> Self {
        let entries = [
            ("dota", "Dota 2"),
            ("cs2", "Counter-Strike 2"),
            ("valorant", "Valorant"),
            ("fc", "EA Sports FC"),
            ("tetris", "Tetris Duel"),
        ]
        .into_iter()
        .map(|(id, name)| {
            (
                id.to_owned(),
                EventEntry {
                    name: name.to_owned(),
                    link: Some(format!("{FALLBACK_DELIVERY_LINK}/{id}")),
                },
            )
        })
        .collect();

        Self { entries }
    }

    /// Configured name of an event, when the catalog knows it.
    pub fn known_name(&self, event_id: &str) -> Option<String> {
        self.entries.get(event_id).map(|entry| entry.name.clone())
    }

    /// Human-readable name of an event, or the raw identifier when unknown.
    pub fn display_name(&self, event_id: &str) -> String {
        self.known_name(event_id)
            .unwrap_or_else(|| event_id.to_owned())
    }

    /// Delivery link of an event, or the placeholder when unknown.
    pub fn delivery_link(&self, event_id: &str) -> String {
        self.entries
            .get(event_id)
            .and_then(|entry| entry.link.clone())
            .unwrap_or_else(|| FALLBACK_DELIVERY_LINK.to_owned())
    }

    /// Number of configured events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no events are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    admin_id: Option<String>,
    #[serde(default)]
    broadcast: RawBroadcast,
    #[serde(default)]
    events: IndexMap<String, RawEvent>,
}

#[derive(Debug, Default, Deserialize)]
/// Broadcast pacing knobs inside the configuration file.
struct RawBroadcast {
    send_delay_ms: Option<u64>,
    notify_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single event catalog entry.
struct RawEvent {
    name: String,
    #[serde(default)]
    link: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();

        let admin_id = raw
            .admin_id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty());

        let events = if raw.events.is_empty() {
            defaults.events
        } else {
            let entries = raw
                .events
                .into_iter()
                .map(|(id, event)| {
                    (
                        id,
                        EventEntry {
                            name: event.name,
                            link: event.link,
                        },
                    )
                })
                .collect();
            EventCatalog { entries }
        };

        Self {
            admin_id,
            data_dir: defaults.data_dir,
            send_delay: raw
                .broadcast
                .send_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.send_delay),
            notify_timeout: raw
                .broadcast
                .notify_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.notify_timeout),
            mirror: None,
            notify: None,
            events,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Non-empty, trimmed value of an environment variable.
fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Millisecond duration value of an environment variable.
fn env_duration_ms(name: &str) -> Option<Duration> {
    let raw = env_string(name)?;
    match raw.parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(err) => {
            warn!(variable = name, value = %raw, error = %err, "ignoring unparsable duration override");
            None
        }
    }
}
