// Configuration loading and parsing (league.toml, store.toml, credentials.toml).

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::draft::pick::ParticipantId;

/// Environment variable that overrides `github_token` from credentials.toml.
pub const GITHUB_TOKEN_ENV: &str = "DRAFT_BOARD_GITHUB_TOKEN";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub store: StoreConfig,
    pub credentials: CredentialsConfig,
    pub data_paths: DataPaths,
    pub metadata: MetadataConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Participant ids in round-1 pick order.
    pub participants: Vec<ParticipantId>,
    pub rounds: u32,
    /// Display names keyed by participant id (as a string, since TOML keys
    /// are strings).
    #[serde(default)]
    pub participant_names: HashMap<String, String>,
}

impl LeagueConfig {
    pub fn participant_name(&self, id: ParticipantId) -> String {
        self.participant_names
            .get(&id.to_string())
            .cloned()
            .unwrap_or_else(|| format!("Team {id}"))
    }
}

// ---------------------------------------------------------------------------
// store.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire store.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StoreFile {
    github: GithubSection,
    local: LocalSection,
    #[serde(default)]
    remote: RemoteSection,
    data_paths: DataPaths,
    metadata: MetadataConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubSection {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalSection {
    pub path: String,
    #[serde(default = "default_true")]
    pub mirror_writes: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct RemoteSection {
    #[serde(default)]
    strict_revisions: bool,
    #[serde(default = "default_http_timeout_secs")]
    http_timeout_secs: u64,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            strict_revisions: false,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// The public store config assembled from the store.toml sections.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub github: GithubSection,
    pub local: LocalSection,
    pub strict_revisions: bool,
    pub http_timeout_secs: u64,
}

impl StoreConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    /// League metadata endpoint listing team ids and names.
    pub bootstrap_url: String,
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}

fn default_branch() -> String {
    "main".into()
}

fn default_commit_message() -> String {
    "Update draft picks".into()
}

fn default_true() -> bool {
    true
}

fn default_http_timeout_secs() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub github_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml`,
/// `config/store.toml`, and (optionally) `config/credentials.toml`,
/// all relative to the given `base_dir`.
///
/// Does not copy defaults or consult the environment. Prefer `load_config()`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;
    let league = league_file.league;

    // --- store.toml (required) ---
    let store_path = config_dir.join("store.toml");
    let store_text = read_file(&store_path)?;
    let store_file: StoreFile =
        toml::from_str(&store_text).map_err(|e| ConfigError::ParseError {
            path: store_path.clone(),
            source: e,
        })?;

    let store = StoreConfig {
        github: store_file.github,
        local: store_file.local,
        strict_revisions: store_file.remote.strict_revisions,
        http_timeout_secs: store_file.remote.http_timeout_secs,
    };

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let mut credentials: CredentialsConfig = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };
    // A blank token is the same as no token.
    if credentials
        .github_token
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        credentials.github_token = None;
    }

    let config = Config {
        league,
        store,
        credentials,
        data_paths: store_file.data_paths,
        metadata: store_file.metadata,
    };

    validate(&config)?;

    Ok(config)
}

/// Files seeded from `defaults/` on first run. Credentials are never seeded;
/// `defaults/credentials.toml.example` is copied by hand.
const SEEDED_FILES: [&str; 2] = ["league.toml", "store.toml"];

/// Copy `league.toml` and `store.toml` from `defaults/` into `config/` when
/// they are missing. Existing files are left alone. Returns the copied paths.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let copy_error = |message: String| ConfigError::DefaultsCopyError { message };

    let mut copied = Vec::new();
    for name in SEEDED_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(copy_error(format!(
                "{} is missing and there is no {} to copy",
                target.display(),
                source.display()
            )));
        }

        std::fs::create_dir_all(&config_dir)
            .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;
        std::fs::copy(&source, &target).map_err(|e| {
            copy_error(format!(
                "cannot copy {} to {}: {e}",
                source.display(),
                target.display()
            ))
        })?;
        info!("Copied default config to {}", target.display());
        copied.push(target);
    }

    Ok(copied)
}

/// Overlay environment settings onto a loaded config.
pub fn apply_env_overrides(config: &mut Config, github_token: Option<String>) {
    if let Some(token) = github_token.filter(|t| !t.trim().is_empty()) {
        config.credentials.github_token = Some(token);
    }
}

/// Loads config relative to the current working directory, copying defaults
/// first and applying `DRAFT_BOARD_GITHUB_TOKEN` last.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    apply_env_overrides(&mut config, std::env::var(GITHUB_TOKEN_ENV).ok());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.participants.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.participants".into(),
            message: "must list at least one participant".into(),
        });
    }

    let mut seen = HashSet::new();
    if let Some(dup) = league.participants.iter().find(|p| !seen.insert(**p)) {
        return Err(ConfigError::ValidationError {
            field: "league.participants".into(),
            message: format!("participant {dup} is listed more than once"),
        });
    }

    if league.rounds == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.rounds".into(),
            message: "must be greater than 0".into(),
        });
    }

    let gh = &config.store.github;
    let required: &[(&str, &str)] = &[
        ("github.api_base", &gh.api_base),
        ("github.owner", &gh.owner),
        ("github.repo", &gh.repo),
        ("github.path", &gh.path),
        ("github.branch", &gh.branch),
        ("local.path", &config.store.local.path),
        ("data_paths.players", &config.data_paths.players),
    ];
    for (name, val) in required {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if config.store.http_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "remote.http_timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
