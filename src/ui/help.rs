//! Help overlay: key reference modal
//!
//! Lists the built-in table keys and the active page's own bindings as a
//! centered popup. The content is rebuilt each time the overlay opens, so it
//! always describes the page underneath.

use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// One line of help content
#[derive(Debug, Clone, PartialEq, Eq)]
enum HelpLine {
    Section(String),
    Key { key: String, desc: String },
    Blank,
}

/// Help overlay showing the key reference
pub struct HelpOverlay {
    visible: bool,
    scroll_offset: usize,
    lines: Vec<HelpLine>,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self {
            visible: false,
            scroll_offset: 0,
            lines: Vec::new(),
        }
    }

    /// Open the overlay with built-in keys and, when present, the page keys
    pub fn show(&mut self, builtin: Vec<(String, String)>, page: Option<(&str, Vec<(String, String)>)>) {
        let mut lines = vec![HelpLine::Section("Table".to_string())];
        lines.extend(
            builtin
                .into_iter()
                .map(|(key, desc)| HelpLine::Key { key, desc }),
        );
        if let Some((name, bindings)) = page {
            lines.push(HelpLine::Blank);
            lines.push(HelpLine::Section(format!("Page '{}'", name)));
            if bindings.is_empty() {
                lines.push(HelpLine::Key {
                    key: String::new(),
                    desc: "(no page keys)".to_string(),
                });
            }
            lines.extend(
                bindings
                    .into_iter()
                    .map(|(key, desc)| HelpLine::Key { key, desc }),
            );
        }
        self.lines = lines;
        self.visible = true;
        self.scroll_offset = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.scroll_offset = 0;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset < self.last_line() {
            self.scroll_offset += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(20);
    }

    pub fn page_down(&mut self) {
        self.scroll_offset = (self.scroll_offset + 20).min(self.last_line());
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.last_line();
    }

    fn build_lines(&self, theme: &Theme) -> Vec<Line<'_>> {
        self.lines
            .iter()
            .map(|line| match line {
                HelpLine::Section(title) => Line::from(Span::styled(title.as_str(), theme.help_section)),
                HelpLine::Key { key, desc } => Line::from(vec![
                    Span::styled(format!("  {:<18}", key), theme.help_key),
                    Span::styled(desc.as_str(), theme.help_desc),
                ]),
                HelpLine::Blank => Line::from(""),
            })
            .collect()
    }

    /// Render the overlay centered in `area`
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup = centered(area, 64, 80);
        if popup.height < 3 {
            return;
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Help (Esc to close) ")
            .border_style(theme.border);
        let inner = block.inner(popup);
        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);

        let lines = self.build_lines(theme);
        let visible: Vec<Line> = lines
            .into_iter()
            .skip(self.scroll_offset)
            .take(inner.height as usize)
            .collect();
        frame.render_widget(Paragraph::new(visible), inner);
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}

/// A rectangle of at most `width` columns and `percent_y` percent of the
/// height, centered in `area`
fn centered(area: Rect, width: u16, percent_y: u16) -> Rect {
    let width = width.min(area.width);
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    let height = height.max(area.height.min(3));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
