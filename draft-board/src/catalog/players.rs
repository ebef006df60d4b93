// Player catalog loading and filtering.
//
// Reads the ranked player CSV (id, web_name, position, team, tier, my_rank,
// draft_rank, var). Extra columns are ignored. The catalog is immutable once
// loaded.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::draft::pick::PlayerId;

/// Team identifier as used by the league metadata endpoint.
pub type TeamId = u32;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Parse a catalog position code. Accepts the long forms too.
    pub fn from_str_pos(s: &str) -> Option<Position> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GKP" | "GK" | "GOALKEEPER" => Some(Position::Goalkeeper),
            "DEF" | "DEFENDER" => Some(Position::Defender),
            "MID" | "MIDFIELDER" => Some(Position::Midfielder),
            "FWD" | "FORWARD" => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub web_name: String,
    pub position: Position,
    pub team: TeamId,
    /// 0 when the CSV leaves it blank.
    pub tier: u32,
    /// Personal rank; 0 when unranked.
    pub my_rank: u32,
    pub draft_rank: u32,
    /// Value above replacement per game.
    pub var: f64,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// Ranking columns are read as floats since spreadsheet exports often write
/// `3.0` for integer ranks.
#[derive(Debug, Deserialize)]
struct RawPlayer {
    id: PlayerId,
    web_name: String,
    position: String,
    team: TeamId,
    #[serde(default)]
    tier: Option<f64>,
    #[serde(default)]
    my_rank: Option<f64>,
    #[serde(default)]
    draft_rank: Option<f64>,
    #[serde(default)]
    var: Option<f64>,
}

fn rank_value(v: Option<f64>) -> u32 {
    match v {
        Some(f) if f.is_finite() && f > 0.0 => f.round() as u32,
        _ => 0,
    }
}

fn players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.deserialize::<RawPlayer>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        };
        let Some(position) = Position::from_str_pos(&raw.position) else {
            warn!(
                "skipping player '{}': unknown position '{}'",
                raw.web_name, raw.position
            );
            continue;
        };
        if !seen.insert(raw.id) {
            warn!("skipping duplicate player id {} ('{}')", raw.id, raw.web_name);
            continue;
        }
        let var = raw.var.filter(|v| v.is_finite()).unwrap_or(0.0);

        players.push(Player {
            id: raw.id,
            web_name: raw.web_name,
            position,
            team: raw.team,
            tier: rank_value(raw.tier),
            my_rank: rank_value(raw.my_rank),
            draft_rank: rank_value(raw.draft_rank),
            var,
        });
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Table filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFilter {
    pub position: Option<Position>,
    pub team: Option<TeamId>,
    pub hide_drafted: bool,
    /// Case-insensitive substring of `web_name`. Empty matches everything.
    pub search: String,
}

impl PlayerFilter {
    pub fn matches(&self, player: &Player, drafted: &HashSet<PlayerId>) -> bool {
        if self.position.is_some_and(|p| p != player.position) {
            return false;
        }
        if self.team.is_some_and(|t| t != player.team) {
            return false;
        }
        if self.hide_drafted && drafted.contains(&player.id) {
            return false;
        }
        let needle = self.search.trim();
        needle.is_empty()
            || player
                .web_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// PlayerCatalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlayerCatalog {
    /// Sorted by personal rank, unranked players last.
    players: Vec<Player>,
    by_id: HashMap<PlayerId, usize>,
}

impl PlayerCatalog {
    pub fn new(mut players: Vec<Player>) -> Self {
        players.sort_by_key(|p| (p.my_rank == 0, p.my_rank, p.id));
        let by_id = players.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        Self { players, by_id }
    }

    /// Load the catalog from a CSV file. Zero valid rows is an error.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    pub fn load_from_config(config: &Config) -> Result<Self, CatalogError> {
        Self::load(Path::new(&config.data_paths.players))
    }

    /// Build from any reader; `source` names it in errors.
    pub fn from_reader<R: Read>(rdr: R, source: &str) -> Result<Self, CatalogError> {
        let players = players_from_reader(rdr).map_err(|e| CatalogError::Csv {
            path: source.to_string(),
            source: e,
        })?;
        if players.is_empty() {
            return Err(CatalogError::Validation(format!(
                "player CSV {source} produced zero valid rows"
            )));
        }
        Ok(Self::new(players))
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.by_id.get(&id).map(|&i| &self.players[i])
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Distinct team ids present in the catalog, ascending.
    pub fn team_ids(&self) -> Vec<TeamId> {
        let mut ids: Vec<TeamId> = self.players.iter().map(|p| p.team).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Players passing `filter`, in personal-rank order.
    pub fn filtered<'a>(
        &'a self,
        filter: &PlayerFilter,
        drafted: &HashSet<PlayerId>,
    ) -> Vec<&'a Player> {
        self.players
            .iter()
            .filter(|p| filter.matches(p, drafted))
            .collect()
    }

    /// The `n` undrafted players passing `filter` with the highest `var`.
    ///
    /// `hide_drafted` on the filter is irrelevant here; drafted players are
    /// always excluded.
    pub fn top_available_by_value<'a>(
        &'a self,
        filter: &PlayerFilter,
        drafted: &HashSet<PlayerId>,
        n: usize,
    ) -> Vec<&'a Player> {
        let mut available: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| !drafted.contains(&p.id) && filter.matches(p, drafted))
            .collect();
        available.sort_by(|a, b| b.var.total_cmp(&a.var).then(a.my_rank.cmp(&b.my_rank)));
        available.truncate(n);
        available
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
