// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the latest app snapshot plus local
// UI state (tab, filters, selection). The app task pushes `UiUpdate`
// messages over an mpsc channel; the TUI applies them to `ViewState` and
// re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::catalog::players::{Player, PlayerCatalog, PlayerFilter, Position, TeamId};
use crate::catalog::teams::TeamDirectory;
use crate::draft::pick::PlayerId;
use crate::protocol::{AppSnapshot, BoardEntry, ClockInfo, Notice, TabId, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
#[derive(Default)]
pub struct ViewState {
    /// `None` until the first snapshot arrives.
    pub catalog: Option<Arc<PlayerCatalog>>,
    pub teams: Arc<TeamDirectory>,
    pub drafted: HashSet<PlayerId>,
    pub drafted_by: HashMap<PlayerId, String>,
    pub board: Vec<BoardEntry>,
    pub current_pick_index: usize,
    pub filled_picks: usize,
    pub total_picks: usize,
    pub on_the_clock: Option<ClockInfo>,
    pub store_label: String,
    pub loaded_from_fallback: bool,
    /// Latest notice from the app task.
    pub notice: Option<Notice>,
    pub active_tab: TabId,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
    /// Selected row in the players table.
    pub selected: usize,
    /// Name search text.
    pub filter_text: String,
    /// Whether the search input is active.
    pub filter_mode: bool,
    pub position_filter: Option<Position>,
    pub team_filter: Option<TeamId>,
    pub hide_drafted: bool,
    /// Whether the quit confirmation dialog is showing.
    pub confirm_quit: bool,
}

impl ViewState {
    /// Apply a full state snapshot from the app task. Local UI state is
    /// left unchanged apart from clamping the selection.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        self.catalog = Some(snapshot.catalog);
        self.teams = snapshot.teams;
        self.drafted = snapshot.drafted;
        self.drafted_by = snapshot.drafted_by;
        self.board = snapshot.board;
        self.current_pick_index = snapshot.current_pick_index;
        self.filled_picks = snapshot.filled_picks;
        self.total_picks = snapshot.total_picks;
        self.on_the_clock = snapshot.on_the_clock;
        self.store_label = snapshot.store_label;
        self.loaded_from_fallback = snapshot.loaded_from_fallback;
        self.clamp_selection();
    }

    pub fn player_filter(&self) -> PlayerFilter {
        PlayerFilter {
            position: self.position_filter,
            team: self.team_filter,
            hide_drafted: self.hide_drafted,
            search: self.filter_text.clone(),
        }
    }

    /// Players shown in the table under the current filters.
    pub fn visible_players(&self) -> Vec<&Player> {
        match &self.catalog {
            Some(catalog) => catalog.filtered(&self.player_filter(), &self.drafted),
            None => Vec::new(),
        }
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.visible_players().get(self.selected).copied()
    }

    /// Team ids for the team filter cycle, ordered by name.
    pub fn team_cycle(&self) -> Vec<TeamId> {
        match &self.catalog {
            Some(catalog) => self.teams.sort_by_name(&catalog.team_ids()),
            None => Vec::new(),
        }
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_players().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::Notice(notice) => {
            state.notice = Some(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    match state.active_tab {
        TabId::Players => widgets::players::render(frame, layout.main_panel, state),
        TabId::Board => widgets::board::render(frame, layout.main_panel, state),
    }
    widgets::clock::render(frame, layout.clock, state);
    widgets::top_value::render(frame, layout.top_value, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Restore the terminal before the original panic hook prints
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // 3. Main loop
    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App task is gone
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::new(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::new(e).context("failed to draw frame"));
                }
            }
        }
    };

    // 4. Restore terminal
    ratatui::restore();

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::NoticeLevel;

    pub(crate) fn make_player(id: PlayerId, name: &str, pos: Position, team: TeamId, rank: u32, var: f64) -> Player {
        Player {
            id,
            web_name: name.to_string(),
            position: pos,
            team,
            tier: 1,
            my_rank: rank,
            draft_rank: rank,
            var,
        }
    }

    /// All cell symbols of a test terminal, row after row.
    pub(crate) fn buffer_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    /// A view state populated as if a snapshot had arrived: four players,
    /// two participants, player 10 drafted by Alice.
    pub(crate) fn populated_view_state() -> ViewState {
        let catalog = PlayerCatalog::new(vec![
            make_player(10, "Salah", Position::Midfielder, 12, 1, 3.4),
            make_player(11, "Haaland", Position::Forward, 13, 2, 3.0),
            make_player(12, "Raya", Position::Goalkeeper, 1, 3, 1.2),
            make_player(13, "Gabriel", Position::Defender, 1, 4, 0.9),
        ]);
        let teams = TeamDirectory::from_pairs([
            (1, "Arsenal".to_string()),
            (12, "Liverpool".to_string()),
            (13, "Man City".to_string()),
        ]);
        let board = vec![
            BoardEntry {
                pick_number: 1,
                round: 1,
                participant: 1,
                participant_name: "Alice".into(),
                player_id: Some(10),
            },
            BoardEntry {
                pick_number: 2,
                round: 1,
                participant: 2,
                participant_name: "Bob".into(),
                player_id: None,
            },
        ];
        let mut state = ViewState::default();
        state.apply_snapshot(AppSnapshot {
            catalog: Arc::new(catalog),
            teams: Arc::new(teams),
            drafted: [10].into_iter().collect(),
            drafted_by: [(10, "Alice".to_string())].into_iter().collect(),
            board,
            current_pick_index: 1,
            filled_picks: 1,
            total_picks: 2,
            on_the_clock: Some(ClockInfo {
                pick_number: 2,
                round: 1,
                participant_name: "Bob".into(),
            }),
            store_label: "memory".into(),
            loaded_from_fallback: false,
        });
        state
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.catalog.is_none());
        assert!(state.visible_players().is_empty());
        assert!(state.selected_player().is_none());
        assert_eq!(state.active_tab, TabId::Players);
        assert_eq!(state.total_picks, 0);
        assert!(state.notice.is_none());
        assert!(!state.filter_mode);
        assert!(!state.confirm_quit);
        assert!(!state.hide_drafted);
    }

    #[test]
    fn apply_snapshot_updates_fields() {
        let state = populated_view_state();
        assert_eq!(state.visible_players().len(), 4);
        assert_eq!(state.filled_picks, 1);
        assert_eq!(state.total_picks, 2);
        assert_eq!(state.on_the_clock.as_ref().unwrap().participant_name, "Bob");
        assert_eq!(state.selected_player().unwrap().id, 10);
    }

    #[test]
    fn hide_drafted_changes_visible_players() {
        let mut state = populated_view_state();
        state.hide_drafted = true;
        let ids: Vec<PlayerId> = state.visible_players().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![11, 12, 13]);
    }

    #[test]
    fn snapshot_clamps_selection() {
        let mut state = populated_view_state();
        state.selected = 3;
        state.hide_drafted = true;
        state.clamp_selection();
        assert_eq!(state.selected, 2);
    }

    #[test]
    fn team_cycle_is_ordered_by_name() {
        let state = populated_view_state();
        assert_eq!(state.team_cycle(), vec![1, 12, 13]);
    }

    #[test]
    fn apply_ui_update_notice() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Notice(Notice::error("save failed")));
        let notice = state.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, "save failed");
    }

    #[test]
    fn render_frame_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(120, 40);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = populated_view_state();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();

        state.active_tab = TabId::Board;
        state.confirm_quit = true;
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }

    #[test]
    fn render_frame_before_first_snapshot() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }
}
