//! UI theme and styling
//!
//! Defines colors, styles, and visual appearance for all UI components.

use ratatui::style::{Color, Modifier, Style};

/// Application theme
#[derive(Debug, Clone)]
pub struct Theme {
    // Title line
    pub title_page: Style,
    pub title_args: Style,
    pub title_connection: Style,

    // Overlay borders
    pub border: Style,

    // Page table
    pub results_header: Style,
    pub results_header_selected: Style,
    pub results_row_even: Style,
    pub results_row_odd: Style,
    pub results_selected_row: Style,
    pub results_selected: Style,
    pub results_empty: Style,
    pub results_footer: Style,

    // Help overlay
    pub help_section: Style,
    pub help_key: Style,
    pub help_desc: Style,

    // Status messages
    pub status_success: Style,
    pub status_error: Style,
    pub status_info: Style,
    pub status_warning: Style,
    pub status_hint: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            // Title
            title_page: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            title_args: Style::default().fg(Color::White),
            title_connection: Style::default().fg(Color::DarkGray),

            border: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            // Page table
            results_header: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            results_header_selected: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            results_row_even: Style::default().fg(Color::White),
            results_row_odd: Style::default().fg(Color::Gray).bg(Color::Rgb(28, 28, 28)),
            results_selected_row: Style::default().fg(Color::Black).bg(Color::Cyan),
            results_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            results_empty: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            results_footer: Style::default().fg(Color::DarkGray),

            // Help
            help_section: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            help_key: Style::default().fg(Color::Cyan),
            help_desc: Style::default().fg(Color::White),

            // Status messages
            status_success: Style::default().fg(Color::Green),
            status_error: Style::default().fg(Color::Red),
            status_info: Style::default().fg(Color::Blue),
            status_warning: Style::default().fg(Color::Yellow),
            status_hint: Style::default().fg(Color::DarkGray),
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }
}
