// Status bar widget: pick progress, tab indicator, latest notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::{NoticeLevel, TabId};
use crate::tui::ViewState;

/// Layout: [pick counter] | [tab bar] | [notice]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        format!(" {} ", progress_text(state)),
        Style::default().fg(Color::White),
    )];

    spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
    spans.extend(tab_spans(state.active_tab));

    if let Some(notice) = &state.notice {
        spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            notice.text.clone(),
            Style::default().fg(notice_color(notice.level)),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// "Picks 3/90", or "Draft complete (90/90)" once every slot is filled.
pub fn progress_text(state: &ViewState) -> String {
    if state.total_picks > 0 && state.filled_picks >= state.total_picks {
        format!("Draft complete ({}/{})", state.filled_picks, state.total_picks)
    } else {
        format!("Picks {}/{}", state.filled_picks, state.total_picks)
    }
}

pub fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}

/// "[1:Players] [2:Board]" with the active tab highlighted.
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let tabs = [(TabId::Players, "1:Players"), (TabId::Board, "2:Board")];

    let mut spans = Vec::new();
    for (tab_id, label) in tabs {
        let style = if tab_id == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{label}]"), style));
        spans.push(Span::raw(" "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Notice;
    use crate::tui::tests::{buffer_text, populated_view_state};

    #[test]
    fn tab_spans_highlight_active() {
        let spans = tab_spans(TabId::Board);
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn tab_spans_contain_labels() {
        let spans = tab_spans(TabId::Players);
        let labels: Vec<&str> = spans
            .iter()
            .step_by(2)
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(labels, vec!["[1:Players]", "[2:Board]"]);
    }

    #[test]
    fn progress_text_counts_filled_picks() {
        let state = populated_view_state();
        assert_eq!(progress_text(&state), "Picks 1/2");
    }

    #[test]
    fn progress_text_when_complete() {
        let mut state = populated_view_state();
        state.filled_picks = 2;
        assert_eq!(progress_text(&state), "Draft complete (2/2)");
    }

    #[test]
    fn progress_text_before_snapshot() {
        assert_eq!(progress_text(&ViewState::default()), "Picks 0/0");
    }

    #[test]
    fn notice_colors_by_level() {
        assert_eq!(notice_color(NoticeLevel::Info), Color::Green);
        assert_eq!(notice_color(NoticeLevel::Warning), Color::Yellow);
        assert_eq!(notice_color(NoticeLevel::Error), Color::Red);
    }

    #[test]
    fn render_shows_notice_text() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.notice = Some(Notice::error("save failed"));
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("save failed"), "got: {text}");
    }
}
