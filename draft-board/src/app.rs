// Application state and orchestration logic.
//
// The app task owns the draft session and is the only place picks are made.
// It handles commands from the TUI one at a time, waiting for each pick's
// write-through before reading the next command, and pushes a fresh snapshot
// to the TUI after every change.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::catalog::players::PlayerCatalog;
use crate::catalog::teams::TeamDirectory;
use crate::draft::order::pick_number;
use crate::draft::pick::PlayerId;
use crate::protocol::{AppSnapshot, BoardEntry, ClockInfo, Notice, UiUpdate, UserCommand};
use crate::session::{DraftSession, SessionError};
use crate::store::LoadSource;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub session: DraftSession,
    pub catalog: Arc<PlayerCatalog>,
    pub teams: Arc<TeamDirectory>,
    /// Startup warnings, sent to the TUI once the loop starts.
    pub pending_notices: Vec<Notice>,
}

impl AppState {
    pub fn new(session: DraftSession, catalog: PlayerCatalog, teams: TeamDirectory) -> Self {
        Self {
            session,
            catalog: Arc::new(catalog),
            teams: Arc::new(teams),
            pending_notices: Vec::new(),
        }
    }

    pub fn with_notices(mut self, notices: Vec<Notice>) -> Self {
        self.pending_notices = notices;
        self
    }

    /// Build a full snapshot of the draft for the TUI.
    pub fn build_snapshot(&self) -> AppSnapshot {
        let state = self.session.state();

        let board: Vec<BoardEntry> = state
            .order()
            .iter()
            .enumerate()
            .map(|(i, slot)| BoardEntry {
                pick_number: pick_number(i),
                round: slot.round,
                participant: slot.participant,
                participant_name: self.session.participant_name(slot.participant),
                player_id: state.pick_at(i),
            })
            .collect();

        let drafted_by: HashMap<PlayerId, String> = board
            .iter()
            .filter_map(|e| e.player_id.map(|id| (id, e.participant_name.clone())))
            .collect();

        let on_the_clock = state.on_the_clock().map(|slot| ClockInfo {
            pick_number: pick_number(state.current_pick_index()),
            round: slot.round,
            participant_name: self.session.participant_name(slot.participant),
        });

        AppSnapshot {
            catalog: Arc::clone(&self.catalog),
            teams: Arc::clone(&self.teams),
            drafted: state.drafted_player_ids(),
            drafted_by,
            board,
            current_pick_index: state.current_pick_index(),
            filled_picks: state.filled_count(),
            total_picks: state.len(),
            on_the_clock,
            store_label: self.session.store_label(),
            loaded_from_fallback: self.session.load_source() == LoadSource::Fallback,
        }
    }

    /// Draft `player_id` for the participant on the clock and describe the
    /// outcome.
    pub async fn draft_player(&mut self, player_id: PlayerId) -> Notice {
        let Some(player) = self.catalog.get(player_id) else {
            warn!("Ignoring pick of unknown player id {}", player_id);
            return Notice::warning(format!("Unknown player id {player_id}"));
        };
        let player_name = player.web_name.clone();

        match self.session.draft_next(player_id).await {
            Ok(receipt) => Notice::info(format!(
                "Pick {}: {} drafted {}",
                pick_number(receipt.index),
                self.session.participant_name(receipt.slot.participant),
                player_name
            )),
            Err(SessionError::Pick(e)) => {
                info!("Pick of {} rejected: {}", player_name, e);
                Notice::warning(format!("Cannot draft {player_name}: {e}"))
            }
            Err(e @ SessionError::Persist { .. }) => Notice::error(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the application event loop until the TUI quits or its channel closes.
///
/// Sends an initial snapshot (and any startup notices) before handling the
/// first command.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    send_snapshot(&state, &ui_tx).await;
    for notice in std::mem::take(&mut state.pending_notices) {
        let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
    }

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            UserCommand::Quit => {
                info!("Quit command received, shutting down");
                break;
            }
            cmd => handle_user_command(&mut state, cmd, &ui_tx).await,
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

/// Handle a user command from the TUI.
async fn handle_user_command(state: &mut AppState, cmd: UserCommand, ui_tx: &mpsc::Sender<UiUpdate>) {
    match cmd {
        UserCommand::DraftPlayer { player_id } => {
            let notice = state.draft_player(player_id).await;
            send_snapshot(state, ui_tx).await;
            let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::StateSnapshot(Box::new(snapshot))).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
