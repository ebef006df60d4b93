// Draft board widget: every slot of the snake order with its pick.
//
// The slot on the clock is highlighted. Scrolled with j/k on the Board tab.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::draft::pick::PlayerId;
use crate::protocol::BoardEntry;
use crate::tui::input::BOARD_SCROLL_KEY;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            "Draft Board ({}/{})",
            state.filled_picks, state.total_picks
        ));

    if state.board.is_empty() {
        let paragraph = Paragraph::new("  No draft order.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // Subtract 2 for borders
    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let scroll_offset = state
        .scroll_offset
        .get(BOARD_SCROLL_KEY)
        .copied()
        .unwrap_or(0)
        .min(state.board.len().saturating_sub(visible_rows));

    let items: Vec<ListItem> = state
        .board
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows)
        .map(|(i, entry)| format_entry(entry, i == state.current_pick_index, state))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// " 12  R2  Alice         Salah (MID, Liverpool)"
fn format_entry(entry: &BoardEntry, on_the_clock: bool, state: &ViewState) -> ListItem<'static> {
    let prefix = format!(
        "{:>3}  R{:<2} {:<14}",
        entry.pick_number, entry.round, entry.participant_name
    );

    let pick = match entry.player_id {
        Some(id) => Span::styled(player_label(id, state), Style::default().fg(Color::White)),
        None if on_the_clock => Span::styled(
            "<< on the clock",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("-", Style::default().fg(Color::DarkGray)),
    };

    let prefix_style = if on_the_clock {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    ListItem::new(Line::from(vec![
        Span::styled(prefix, prefix_style),
        Span::raw(" "),
        pick,
    ]))
}

/// Player name with position and club; falls back to the raw id for players
/// missing from the catalog.
pub fn player_label(id: PlayerId, state: &ViewState) -> String {
    match state.catalog.as_ref().and_then(|c| c.get(id)) {
        Some(p) => format!(
            "{} ({}, {})",
            p.web_name,
            p.position.display_str(),
            state.teams.name(p.team)
        ),
        None => format!("#{id}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::{buffer_text, populated_view_state};

    #[test]
    fn player_label_uses_catalog_and_teams() {
        let state = populated_view_state();
        assert_eq!(player_label(10, &state), "Salah (MID, Liverpool)");
    }

    #[test]
    fn player_label_unknown_id() {
        let state = populated_view_state();
        assert_eq!(player_label(999, &state), "#999");
    }

    #[test]
    fn render_marks_pick_on_the_clock() {
        let backend = ratatui::backend::TestBackend::new(80, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = populated_view_state();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Salah (MID, Liverpool)"));
        assert!(text.contains("on the clock"));
        assert!(text.contains("Bob"));
    }

    #[test]
    fn render_clamps_scroll_offset() {
        let backend = ratatui::backend::TestBackend::new(80, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = populated_view_state();
        state
            .scroll_offset
            .insert(BOARD_SCROLL_KEY.to_string(), 50);
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        // Both entries fit, so the offset clamps to zero
        let text = buffer_text(&terminal);
        assert!(text.contains("Alice"));
    }

    #[test]
    fn render_empty_board() {
        let backend = ratatui::backend::TestBackend::new(40, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        assert!(buffer_text(&terminal).contains("No draft order."));
    }
}
