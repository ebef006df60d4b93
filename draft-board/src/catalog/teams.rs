// Team names from the league metadata endpoint (`bootstrap-static`).

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::players::TeamId;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("metadata endpoint returned status {0}")]
    Status(u16),

    #[error("unexpected metadata payload: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct BootstrapStatic {
    teams: Vec<RawTeam>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: TeamId,
    name: String,
}

/// Team id to display name. An empty directory shows numeric ids.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    names: HashMap<TeamId, String>,
}

impl TeamDirectory {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (TeamId, String)>) -> Self {
        Self {
            names: pairs.into_iter().collect(),
        }
    }

    /// Parse a `bootstrap-static` response body. Only `teams[].id` and
    /// `teams[].name` are read.
    pub fn parse_bootstrap(body: &str) -> Result<Self, MetadataError> {
        let parsed: BootstrapStatic = serde_json::from_str(body)?;
        Ok(Self::from_pairs(
            parsed.teams.into_iter().map(|t| (t.id, t.name)),
        ))
    }

    /// Fetch and parse the team list once.
    pub async fn fetch(http: &reqwest::Client, url: &str) -> Result<Self, MetadataError> {
        let response = http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        let directory = Self::parse_bootstrap(&body)?;
        info!("Loaded {} team names", directory.len());
        Ok(directory)
    }

    /// Display name, or the numeric id when unknown.
    pub fn name(&self, id: TeamId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `ids` ordered by display name, for the team filter cycle.
    pub fn sort_by_name(&self, ids: &[TeamId]) -> Vec<TeamId> {
        let mut sorted = ids.to_vec();
        sorted.sort_by_cached_key(|id| (self.name(*id), *id));
        sorted
    }
}
