//! Screen layout
//!
//! One title line, the page table, one status line.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub title: Rect,
    pub table: Rect,
    pub status: Rect,
}

/// Split the terminal area into title, table and status line
pub fn calculate_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    ScreenLayout {
        title: chunks[0],
        table: chunks[1],
        status: chunks[2],
    }
}
