// GitHub contents API adapter for the pick store.
//
// The picks document lives at a fixed path in a repository. Reads decode the
// base64 `content` field; writes PUT the whole document, carrying the file's
// current blob `sha` when the file already exists.

use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{decode_picks, encode_picks, PickStore, StoreError};
use crate::config::GithubSection;
use crate::draft::pick::PickMap;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const GITHUB_API_VERSION: &str = "2022-11-28";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Subset of a contents API file response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentsResponse {
    pub sha: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Body of a create-or-update PUT.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct PutRequest {
    pub message: String,
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: Option<PutContent>,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

// ---------------------------------------------------------------------------
// GithubStore
// ---------------------------------------------------------------------------

/// Which file to read and write.
#[derive(Debug, Clone)]
pub struct GithubTarget {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub commit_message: String,
}

impl From<&GithubSection> for GithubTarget {
    fn from(section: &GithubSection) -> Self {
        GithubTarget {
            api_base: section.api_base.clone(),
            owner: section.owner.clone(),
            repo: section.repo.clone(),
            path: section.path.clone(),
            branch: section.branch.clone(),
            commit_message: section.commit_message.clone(),
        }
    }
}

impl GithubTarget {
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.path.trim_start_matches('/')
        )
    }
}

pub struct GithubStore {
    http: reqwest::Client,
    target: GithubTarget,
    token: String,
    strict_revisions: bool,
    /// Last blob sha this session read or wrote.
    last_revision: Mutex<Option<String>>,
}

impl GithubStore {
    pub fn new(
        http: reqwest::Client,
        target: GithubTarget,
        token: String,
        strict_revisions: bool,
    ) -> Self {
        Self {
            http,
            target,
            token,
            strict_revisions,
            last_revision: Mutex::new(None),
        }
    }

    fn remember_revision(&self, sha: Option<String>) {
        let mut guard = self
            .last_revision
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = sha;
    }

    fn known_revision(&self) -> Option<String> {
        self.last_revision
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn get(&self) -> reqwest::RequestBuilder {
        self.http
            .get(self.target.contents_url())
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(GITHUB_API_VERSION_HEADER, GITHUB_API_VERSION)
            .query(&[("ref", self.target.branch.as_str())])
    }

    /// Look up the file's current blob sha. `None` when the file does not
    /// exist yet.
    pub async fn fetch_revision(&self) -> Result<Option<String>, StoreError> {
        let cache_buster = chrono::Utc::now().timestamp().to_string();
        let response = self
            .get()
            .query(&[("t", cache_buster.as_str())])
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("picks file does not exist yet");
            return Ok(None);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: body,
            });
        }
        let contents = parse_contents(&body)?;
        Ok(Some(contents.sha))
    }
}

#[async_trait]
impl PickStore for GithubStore {
    fn label(&self) -> String {
        format!(
            "github:{}/{}/{}@{}",
            self.target.owner, self.target.repo, self.target.path, self.target.branch
        )
    }

    async fn read_picks(&self) -> Result<PickMap, StoreError> {
        let response = self.get().send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let contents = parse_contents(&body)?;
        let picks = decode_contents(&contents)?;
        self.remember_revision(Some(contents.sha));
        Ok(picks)
    }

    async fn write_picks(&self, picks: &PickMap) -> Result<(), StoreError> {
        let document = encode_picks(picks)?;
        let current = self.fetch_revision().await.map_err(as_write_failure)?;
        if let Err(conflict) = check_revision(
            self.strict_revisions,
            self.known_revision().as_deref(),
            current.as_deref(),
        ) {
            // Reported once. The next save is made against the store's
            // revision.
            warn!("{}", conflict);
            self.remember_revision(current);
            return Err(conflict);
        }

        if current.is_none() {
            info!("Creating picks file at {}", self.label());
        }
        let message = format!(
            "{} ({})",
            self.target.commit_message,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        let body = build_put_request(
            &message,
            &document,
            &self.target.branch,
            current,
        );

        let response = self
            .http
            .put(self.target.contents_url())
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(GITHUB_API_VERSION_HEADER, GITHUB_API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(StoreError::WriteFailed {
                status: status.as_u16(),
                message: text,
            });
        }

        match serde_json::from_str::<PutResponse>(&text) {
            Ok(PutResponse {
                content: Some(content),
            }) => self.remember_revision(Some(content.sha)),
            _ => {
                warn!("PUT succeeded but response had no content sha, looking it up");
                match self.fetch_revision().await {
                    Ok(sha) => self.remember_revision(sha),
                    Err(e) => {
                        warn!("Could not refresh picks file revision: {}", e);
                        self.remember_revision(None);
                    }
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_contents(body: &str) -> Result<ContentsResponse, StoreError> {
    serde_json::from_str(body)
        .map_err(|e| StoreError::Parse(format!("unexpected contents response: {e}")))
}

/// Decode the base64 document embedded in a contents response.
///
/// GitHub wraps the base64 text across lines, so whitespace is dropped
/// before decoding. Empty content is an empty pick map.
pub(crate) fn decode_contents(contents: &ContentsResponse) -> Result<PickMap, StoreError> {
    if let Some(encoding) = contents.encoding.as_deref() {
        if !encoding.is_empty() && encoding != "base64" {
            return Err(StoreError::Parse(format!(
                "unsupported content encoding `{encoding}`"
            )));
        }
    }

    let compact: String = contents
        .content
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if compact.is_empty() {
        return Ok(PickMap::new());
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| StoreError::Parse(format!("invalid base64 content: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| StoreError::Parse(format!("content is not UTF-8: {e}")))?;
    decode_picks(&text)
}

/// Any non-success answer while saving is a failed write, including the
/// revision lookup that precedes the PUT.
fn as_write_failure(err: StoreError) -> StoreError {
    match err {
        StoreError::Status { status, message } => StoreError::WriteFailed { status, message },
        other => other,
    }
}

pub(crate) fn build_put_request(
    message: &str,
    document: &str,
    branch: &str,
    sha: Option<String>,
) -> PutRequest {
    PutRequest {
        message: message.to_string(),
        content: base64::engine::general_purpose::STANDARD.encode(document.as_bytes()),
        branch: branch.to_string(),
        sha,
    }
}

/// In strict mode, the store's current revision must be the one this session
/// last saw. Otherwise any revision is accepted (last writer wins).
pub(crate) fn check_revision(
    strict: bool,
    known: Option<&str>,
    current: Option<&str>,
) -> Result<(), StoreError> {
    if !strict || known == current {
        return Ok(());
    }
    Err(StoreError::WriteConflict {
        expected: known.unwrap_or("<none>").to_string(),
        found: current.unwrap_or("<none>").to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
