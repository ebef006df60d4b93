// Top value widget: the best undrafted players by value above replacement.
//
// Follows the players table's position, team, and search filters so the list
// answers "who is best here" for whatever the table is narrowed to.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use crate::catalog::players::Player;
use crate::tui::ViewState;

const TOP_N: usize = 10;
const BAR_WIDTH: usize = 10;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let top = top_players(state);
    let max_var = top.iter().map(|p| p.var).fold(0.0_f64, f64::max);

    let items: Vec<ListItem> = top
        .iter()
        .enumerate()
        .map(|(i, p)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::Gray)),
                Span::styled(format!("{:<14}", p.web_name), Style::default().fg(Color::White)),
                Span::styled(
                    format!("{} ", p.position.display_str()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:<width$}", bar(p.var, max_var), width = BAR_WIDTH + 1),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(format!("{:>5.2}", p.var), Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Top {} Available by VAR", TOP_N)),
    );
    frame.render_widget(list, area);
}

pub fn top_players(state: &ViewState) -> Vec<&Player> {
    match &state.catalog {
        Some(catalog) => catalog.top_available_by_value(&state.player_filter(), &state.drafted, TOP_N),
        None => Vec::new(),
    }
}

/// A bar of up to `BAR_WIDTH` cells, scaled against the largest value.
/// Non-positive values get no bar.
pub fn bar(value: f64, max: f64) -> String {
    if value <= 0.0 || max <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(cells.clamp(1, BAR_WIDTH))
}
