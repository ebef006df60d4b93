// Players widget: the ranked catalog as a filterable table.
//
// Rows follow personal rank. Drafted players stay in the table (dimmed, with
// the drafting participant) unless hide-drafted is on.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crate::catalog::players::Player;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let visible = state.visible_players();

    let header = Row::new(vec![
        Cell::from("Tier"),
        Cell::from("Rank"),
        Cell::from("ADP"),
        Cell::from("Name"),
        Cell::from("Pos"),
        Cell::from("Team"),
        Cell::from("VAR"),
        Cell::from("Drafted by"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = visible
        .iter()
        .map(|p| {
            let drafted_by = state.drafted_by.get(&p.id);
            let style = if drafted_by.is_some() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format_rank(p.tier)),
                Cell::from(format_rank(p.my_rank)),
                Cell::from(format_rank(p.draft_rank)),
                Cell::from(p.web_name.clone()),
                Cell::from(p.position.display_str()),
                Cell::from(state.teams.name(p.team)),
                Cell::from(format!("{:.2}", p.var)),
                Cell::from(drafted_by.cloned().unwrap_or_default()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Min(14),
        Constraint::Length(4),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(build_title(state, &visible)),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !visible.is_empty() {
        table_state.select(Some(state.selected.min(visible.len() - 1)));
    }

    frame.render_stateful_widget(table, area, &mut table_state);
}

/// "-" for an unset (zero) rank.
pub fn format_rank(rank: u32) -> String {
    if rank == 0 {
        "-".to_string()
    } else {
        rank.to_string()
    }
}

/// "Players [MID] [Arsenal] "sal" (available) (12)"
fn build_title(state: &ViewState, visible: &[&Player]) -> Line<'static> {
    let mut title = String::from("Players");
    if let Some(pos) = state.position_filter {
        title.push_str(&format!(" [{}]", pos.display_str()));
    }
    if let Some(team) = state.team_filter {
        title.push_str(&format!(" [{}]", state.teams.name(team)));
    }
    if !state.filter_text.is_empty() || state.filter_mode {
        title.push_str(&format!(" \"{}\"", state.filter_text));
        if state.filter_mode {
            title.push('_');
        }
    }
    if state.hide_drafted {
        title.push_str(" (available)");
    }
    title.push_str(&format!(" ({})", visible.len()));
    Line::from(title)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::players::Position;
    use crate::tui::tests::{buffer_text, populated_view_state};

    #[test]
    fn format_rank_blank_for_zero() {
        assert_eq!(format_rank(0), "-");
        assert_eq!(format_rank(7), "7");
    }

    #[test]
    fn title_lists_active_filters() {
        let mut state = populated_view_state();
        state.position_filter = Some(Position::Defender);
        state.team_filter = Some(1);
        state.filter_text = "gab".into();
        state.hide_drafted = true;
        let visible = state.visible_players();
        let title = build_title(&state, &visible).to_string();
        assert_eq!(title, "Players [DEF] [Arsenal] \"gab\" (available) (1)");
    }

    #[test]
    fn title_without_filters() {
        let state = populated_view_state();
        let visible = state.visible_players();
        assert_eq!(build_title(&state, &visible).to_string(), "Players (4)");
    }

    #[test]
    fn render_shows_players_and_drafter() {
        let backend = ratatui::backend::TestBackend::new(100, 12);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = populated_view_state();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Salah"));
        assert!(text.contains("Haaland"));
        assert!(text.contains("Liverpool"));
        assert!(text.contains("Alice"));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(60, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
