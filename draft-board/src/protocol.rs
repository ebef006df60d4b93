// Messages between the app task and the TUI task.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::catalog::players::PlayerCatalog;
use crate::catalog::teams::TeamDirectory;
use crate::draft::pick::{ParticipantId, PlayerId};

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Draft a player for whoever is on the clock.
    DraftPlayer { player_id: PlayerId },
    Quit,
}

// ---------------------------------------------------------------------------
// App -> TUI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A one-line message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    Players,
    Board,
}

/// One row of the draft board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry {
    /// 1-indexed overall pick number.
    pub pick_number: usize,
    pub round: u32,
    pub participant: ParticipantId,
    pub participant_name: String,
    pub player_id: Option<PlayerId>,
}

/// Who is picking next.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockInfo {
    pub pick_number: usize,
    pub round: u32,
    pub participant_name: String,
}

/// Everything the TUI needs to draw a frame.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub catalog: Arc<PlayerCatalog>,
    pub teams: Arc<TeamDirectory>,
    pub drafted: HashSet<PlayerId>,
    /// Player id to the name of the participant who drafted them.
    pub drafted_by: HashMap<PlayerId, String>,
    pub board: Vec<BoardEntry>,
    pub current_pick_index: usize,
    pub filled_picks: usize,
    pub total_picks: usize,
    /// `None` once the draft is complete.
    pub on_the_clock: Option<ClockInfo>,
    pub store_label: String,
    /// The session started from the local copy because the store was
    /// unreadable.
    pub loaded_from_fallback: bool,
}
