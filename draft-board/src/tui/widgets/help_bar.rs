// Help bar widget: key hints for the current mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn help_text(state: &ViewState) -> &'static str {
    if state.confirm_quit {
        " y:Quit | n:Cancel"
    } else if state.filter_mode {
        " Type to search | Enter:Keep | Esc:Clear"
    } else {
        match state.active_tab {
            TabId::Players => {
                " q:Quit | 1-2:Tabs | j/k:Move | Enter:Draft | /:Search | p:Pos | t:Team | h:Hide drafted | Esc:Clear"
            }
            TabId::Board => " q:Quit | 1-2:Tabs | j/k:Scroll",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_text_follows_mode() {
        let mut state = ViewState::default();
        assert!(help_text(&state).contains("Enter:Draft"));

        state.active_tab = TabId::Board;
        assert!(!help_text(&state).contains("Enter:Draft"));

        state.filter_mode = true;
        assert!(help_text(&state).contains("Type to search"));

        state.confirm_quit = true;
        assert_eq!(help_text(&state), " y:Quit | n:Cancel");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
