// On-the-clock widget: whose pick it is, and where picks are saved.
//
// A session that started from the local copy says so until restart.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let headline = match (&state.on_the_clock, state.total_picks) {
        (_, 0) => Line::from(Span::styled(
            "  Waiting for draft state...",
            Style::default().fg(Color::DarkGray),
        )),
        (Some(clock), _) => Line::from(vec![
            Span::raw("  "),
            Span::styled(
                clock.participant_name.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" (pick {}, round {})", clock.pick_number, clock.round)),
        ]),
        (None, _) => Line::from(Span::styled(
            "  Draft complete",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
    };

    let store_line = Line::from(Span::styled(
        format!("  Saving to {}", store_text(state)),
        Style::default().fg(Color::Gray),
    ));

    let source_line = if state.loaded_from_fallback {
        Line::from(Span::styled(
            "  Resumed from local copy",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::raw("")
    };

    let paragraph = Paragraph::new(vec![headline, source_line, store_line]).block(
        Block::default()
            .borders(Borders::ALL)
            .title("On the Clock"),
    );
    frame.render_widget(paragraph, area);
}

fn store_text(state: &ViewState) -> &str {
    if state.store_label.is_empty() {
        "-"
    } else {
        &state.store_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::{buffer_text, populated_view_state};

    fn draw(state: &ViewState) -> String {
        let backend = ratatui::backend::TestBackend::new(50, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn shows_participant_on_the_clock() {
        let text = draw(&populated_view_state());
        assert!(text.contains("Bob (pick 2, round 1)"));
        assert!(text.contains("Saving to memory"));
        assert!(!text.contains("local copy"));
    }

    #[test]
    fn flags_session_resumed_from_local_copy() {
        let mut state = populated_view_state();
        state.loaded_from_fallback = true;
        assert!(draw(&state).contains("Resumed from local copy"));
    }

    #[test]
    fn shows_complete_when_no_one_is_on_the_clock() {
        let mut state = populated_view_state();
        state.on_the_clock = None;
        assert!(draw(&state).contains("Draft complete"));
    }

    #[test]
    fn waits_before_first_snapshot() {
        assert!(draw(&ViewState::default()).contains("Waiting"));
    }
}
