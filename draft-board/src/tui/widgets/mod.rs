// TUI widget modules for each dashboard panel.

pub mod board;
pub mod clock;
pub mod help_bar;
pub mod players;
pub mod quit_confirm;
pub mod status_bar;
pub mod top_value;
