// Pick persistence: the `PickStore` port, its adapters, and the JSON codec.
//
// Picks are stored as a single JSON object mapping `"<round>_<participant>"`
// to a player id or null. Every write replaces the whole document.

pub mod github;
pub mod local;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::draft::pick::{PickKey, PickMap, PlayerId};

use github::{GithubStore, GithubTarget};
use local::LocalFileStore;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(String),

    /// No stored document yet. Expected on the first run of a draft.
    #[error("no stored draft picks found")]
    NotFound,

    #[error("stored draft picks are not valid: {0}")]
    Parse(String),

    #[error("store returned unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("revision conflict: last seen {expected}, store now has {found}")]
    WriteConflict { expected: String, found: String },

    #[error("failed to save draft picks: {status} {message}")]
    WriteFailed { status: u16, message: String },

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// PickStore port
// ---------------------------------------------------------------------------

/// A place the full pick mapping can be read from and written to.
#[async_trait]
pub trait PickStore: Send + Sync {
    /// Short human-readable name for logs and notices.
    fn label(&self) -> String;

    /// Read the stored picks. `StoreError::NotFound` when nothing is stored.
    async fn read_picks(&self) -> Result<PickMap, StoreError>;

    /// Replace the stored picks with `picks`.
    async fn write_picks(&self, picks: &PickMap) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Serializes a pick map as an object keyed in (round, participant) order.
struct OrderedPicks<'a>(&'a PickMap);

impl Serialize for OrderedPicks<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k.to_string(), v)))
    }
}

/// Encode picks as pretty-printed JSON (two-space indent).
pub fn encode_picks(picks: &PickMap) -> Result<String, StoreError> {
    serde_json::to_string_pretty(&OrderedPicks(picks))
        .map_err(|e| StoreError::Parse(format!("failed to serialize picks: {e}")))
}

/// Decode the stored JSON document.
///
/// Blank input is an empty mapping. Entries with an unparsable key or value
/// are skipped with a warning; a document that is not a JSON object is a
/// `StoreError::Parse`.
pub fn decode_picks(text: &str) -> Result<PickMap, StoreError> {
    if text.trim().is_empty() {
        return Ok(PickMap::new());
    }

    let raw: serde_json::Map<String, Value> =
        serde_json::from_str(text).map_err(|e| StoreError::Parse(e.to_string()))?;

    let mut picks = PickMap::new();
    for (raw_key, raw_value) in raw {
        let key: PickKey = match raw_key.parse() {
            Ok(k) => k,
            Err(e) => {
                warn!("skipping stored pick: {}", e);
                continue;
            }
        };
        match player_id_from_value(&raw_value) {
            Some(value) => {
                picks.insert(key, value);
            }
            None => {
                warn!("skipping stored pick {}: invalid player id {}", key, raw_value);
            }
        }
    }
    Ok(picks)
}

/// `Some(None)` for null, `Some(Some(id))` for an integral id, `None` when
/// the value cannot be a player id.
fn player_id_from_value(value: &Value) -> Option<Option<PlayerId>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return PlayerId::try_from(u).ok().map(Some);
            }
            let f = n.as_f64()?;
            if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= PlayerId::MAX as f64 {
                Some(Some(f as PlayerId))
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<PlayerId>().ok().map(Some),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Persistence (remote store + local fallback)
// ---------------------------------------------------------------------------

/// Where the initial picks came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Fallback,
    Empty,
}

/// Result of a startup read. Never an error: failures degrade to the
/// fallback copy or to an empty draft, with `warning` explaining why.
#[derive(Debug, Clone)]
pub struct LoadedPicks {
    pub picks: PickMap,
    pub source: LoadSource,
    pub warning: Option<String>,
}

/// The persistence port used by the draft session.
pub struct Persistence {
    primary: Arc<dyn PickStore>,
    fallback: Option<Arc<dyn PickStore>>,
    mirror_writes: bool,
}

impl Persistence {
    pub fn new(
        primary: Arc<dyn PickStore>,
        fallback: Option<Arc<dyn PickStore>>,
        mirror_writes: bool,
    ) -> Self {
        Self {
            primary,
            fallback,
            mirror_writes,
        }
    }

    /// Build the stores described by the config.
    ///
    /// With a GitHub token the remote file is primary and the local file is
    /// the fallback. Without one the local file is the only store, and the
    /// returned warning says so.
    pub fn from_config(config: &Config, http: reqwest::Client) -> (Self, Option<String>) {
        let local: Arc<dyn PickStore> = Arc::new(LocalFileStore::new(&config.store.local.path));

        match config.credentials.github_token.as_deref() {
            Some(token) if !token.is_empty() => {
                let target = GithubTarget::from(&config.store.github);
                let remote = GithubStore::new(
                    http,
                    target,
                    token.to_string(),
                    config.store.strict_revisions,
                );
                info!("Persisting picks to {}", remote.label());
                (
                    Persistence::new(
                        Arc::new(remote),
                        Some(local),
                        config.store.local.mirror_writes,
                    ),
                    None,
                )
            }
            _ => {
                let warning = format!(
                    "No GitHub token configured; picks are saved to {} only",
                    local.label()
                );
                warn!("{}", warning);
                (Persistence::new(local, None, false), Some(warning))
            }
        }
    }

    /// Read the current picks, falling back to the local copy and then to an
    /// empty draft.
    pub async fn read_state(&self) -> LoadedPicks {
        let primary_err = match self.primary.read_picks().await {
            Ok(picks) => {
                info!("Loaded {} stored picks from {}", picks.len(), self.primary.label());
                return LoadedPicks {
                    picks,
                    source: LoadSource::Primary,
                    warning: None,
                };
            }
            Err(StoreError::NotFound) => {
                info!("No stored picks at {}, starting a fresh draft", self.primary.label());
                return LoadedPicks {
                    picks: PickMap::new(),
                    source: LoadSource::Empty,
                    warning: None,
                };
            }
            Err(e) => e,
        };

        let mut warning = format!(
            "Could not load draft picks from {}: {}",
            self.primary.label(),
            primary_err
        );
        warn!("{}", warning);

        let Some(fallback) = &self.fallback else {
            return LoadedPicks {
                picks: PickMap::new(),
                source: LoadSource::Empty,
                warning: Some(warning),
            };
        };

        match fallback.read_picks().await {
            Ok(picks) => {
                info!("Loaded {} picks from fallback {}", picks.len(), fallback.label());
                warning.push_str(&format!("; using {}", fallback.label()));
                LoadedPicks {
                    picks,
                    source: LoadSource::Fallback,
                    warning: Some(warning),
                }
            }
            Err(e) => {
                warn!("Fallback {} unavailable: {}", fallback.label(), e);
                warning.push_str(&format!(
                    "; fallback {} unavailable ({}), starting empty",
                    fallback.label(),
                    e
                ));
                LoadedPicks {
                    picks: PickMap::new(),
                    source: LoadSource::Empty,
                    warning: Some(warning),
                }
            }
        }
    }

    /// Write the full pick mapping through to the primary store.
    ///
    /// Not retried. After a successful write the local fallback copy is
    /// refreshed when mirroring is enabled; a mirror failure is only logged.
    pub async fn write_state(&self, picks: &PickMap) -> Result<(), StoreError> {
        self.primary.write_picks(picks).await?;

        if self.mirror_writes {
            if let Some(fallback) = &self.fallback {
                if let Err(e) = fallback.write_picks(picks).await {
                    warn!("Failed to mirror picks to {}: {}", fallback.label(), e);
                }
            }
        }
        Ok(())
    }

    pub fn primary_label(&self) -> String {
        self.primary.label()
    }
}

/// Shared HTTP client for the remote store and league metadata.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("draft-board/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
