// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the app
// task, or into local ViewState mutations (tab switching, selection,
// filtering).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::catalog::players::Position;
use crate::protocol::{TabId, UserCommand};

/// Scroll key for the draft board widget.
pub const BOARD_SCROLL_KEY: &str = "board";

/// Page size for PageUp/PageDown.
const PAGE_SIZE: usize = 20;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should go to the app task
/// (draft, quit). Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports both press and release
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if view_state.filter_mode {
        return handle_filter_mode(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char('1') => {
            view_state.active_tab = TabId::Players;
            None
        }
        KeyCode::Char('2') => {
            view_state.active_tab = TabId::Board;
            None
        }

        KeyCode::Up | KeyCode::Char('k') => {
            move_up(view_state, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_down(view_state, 1);
            None
        }
        KeyCode::PageUp => {
            move_up(view_state, PAGE_SIZE);
            None
        }
        KeyCode::PageDown => {
            move_down(view_state, PAGE_SIZE);
            None
        }

        // Filters only apply to the players table
        KeyCode::Char('/') if view_state.active_tab == TabId::Players => {
            view_state.filter_mode = true;
            None
        }
        KeyCode::Char('p') if view_state.active_tab == TabId::Players => {
            cycle_position_filter(view_state);
            view_state.selected = 0;
            None
        }
        KeyCode::Char('t') if view_state.active_tab == TabId::Players => {
            cycle_team_filter(view_state);
            view_state.selected = 0;
            None
        }
        KeyCode::Char('h') if view_state.active_tab == TabId::Players => {
            view_state.hide_drafted = !view_state.hide_drafted;
            view_state.selected = 0;
            None
        }
        KeyCode::Esc => {
            view_state.filter_text.clear();
            view_state.position_filter = None;
            view_state.team_filter = None;
            view_state.selected = 0;
            None
        }

        KeyCode::Enter | KeyCode::Char('d') if view_state.active_tab == TabId::Players => {
            view_state
                .selected_player()
                .map(|p| UserCommand::DraftPlayer { player_id: p.id })
        }

        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// `y`/`q` confirm, `n`/Esc cancel, everything else is ignored.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Printable characters edit the search text; Enter keeps it, Esc clears it.
fn handle_filter_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.filter_mode = false;
            view_state.filter_text.clear();
        }
        KeyCode::Enter => {
            view_state.filter_mode = false;
        }
        KeyCode::Backspace => {
            view_state.filter_text.pop();
        }
        KeyCode::Char(c) => {
            view_state.filter_text.push(c);
        }
        _ => return None,
    }
    view_state.selected = 0;
    None
}

/// All -> GKP -> DEF -> MID -> FWD -> All
fn cycle_position_filter(view_state: &mut ViewState) {
    view_state.position_filter = match view_state.position_filter {
        None => Some(Position::ALL[0]),
        Some(current) => match Position::ALL.iter().position(|p| *p == current) {
            Some(i) if i + 1 < Position::ALL.len() => Some(Position::ALL[i + 1]),
            _ => None,
        },
    };
}

/// All -> teams by name -> All
fn cycle_team_filter(view_state: &mut ViewState) {
    let cycle = view_state.team_cycle();
    view_state.team_filter = match view_state.team_filter {
        None => cycle.first().copied(),
        Some(current) => match cycle.iter().position(|t| *t == current) {
            Some(i) if i + 1 < cycle.len() => Some(cycle[i + 1]),
            _ => None,
        },
    };
}

fn move_up(view_state: &mut ViewState, lines: usize) {
    match view_state.active_tab {
        TabId::Players => {
            view_state.selected = view_state.selected.saturating_sub(lines);
        }
        TabId::Board => {
            let offset = view_state
                .scroll_offset
                .entry(BOARD_SCROLL_KEY.to_string())
                .or_insert(0);
            *offset = offset.saturating_sub(lines);
        }
    }
}

fn move_down(view_state: &mut ViewState, lines: usize) {
    match view_state.active_tab {
        TabId::Players => {
            let last = view_state.visible_players().len().saturating_sub(1);
            view_state.selected = view_state.selected.saturating_add(lines).min(last);
        }
        TabId::Board => {
            let last = view_state.board.len().saturating_sub(1);
            let offset = view_state
                .scroll_offset
                .entry(BOARD_SCROLL_KEY.to_string())
                .or_insert(0);
            *offset = offset.saturating_add(lines).min(last);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
