//! Page table widget
//!
//! Displays the active page's display rows in a scrollable table with a
//! highlighted row, a column cursor for horizontal scrolling and a footer.

use crate::db::QueryResult;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use std::cell::Cell;
use unicode_truncate::UnicodeTruncateStr;
use unicode_width::UnicodeWidthStr;

/// Rows moved by PageUp/PageDown before the first render
const DEFAULT_PAGE: usize = 20;

/// Column widths are capped to keep wide text from hiding other columns
const MAX_COL_WIDTH: u16 = 40;
const MIN_COL_WIDTH: u16 = 4;

/// Cursor and scroll state of the table
pub struct TableView {
    selected_row: usize,
    selected_col: usize,
    /// First visible row, adjusted while rendering
    scroll_offset: Cell<usize>,
    /// First visible column, adjusted while rendering
    h_scroll_offset: Cell<usize>,
    /// Visible body height of the last render
    page_height: Cell<usize>,
    /// Computed column widths
    col_widths: Vec<u16>,
    row_count: usize,
    col_count: usize,
}

impl TableView {
    pub fn new() -> Self {
        Self {
            selected_row: 0,
            selected_col: 0,
            scroll_offset: Cell::new(0),
            h_scroll_offset: Cell::new(0),
            page_height: Cell::new(DEFAULT_PAGE),
            col_widths: Vec::new(),
            row_count: 0,
            col_count: 0,
        }
    }

    /// Show a freshly loaded page: cursor back to the top left
    pub fn set_results(&mut self, results: &QueryResult) {
        self.col_widths = compute_column_widths(results);
        self.row_count = results.rows.len();
        self.col_count = results.columns.len();
        self.selected_row = 0;
        self.selected_col = 0;
        self.scroll_offset.set(0);
        self.h_scroll_offset.set(0);
    }

    /// Show a reloaded page, keeping the cursor where it was when possible
    pub fn refresh(&mut self, results: &QueryResult) {
        self.col_widths = compute_column_widths(results);
        self.row_count = results.rows.len();
        self.col_count = results.columns.len();
        self.selected_row = self.selected_row.min(self.row_count.saturating_sub(1));
        self.selected_col = self.selected_col.min(self.col_count.saturating_sub(1));
    }

    /// Highlighted display row, if the page has rows
    pub fn selected_row(&self) -> Option<usize> {
        (self.selected_row < self.row_count).then_some(self.selected_row)
    }

    pub fn selected_col(&self) -> usize {
        self.selected_col
    }

    /// Tab-separated text of the highlighted row
    pub fn selected_row_text(&self, results: &QueryResult) -> Option<String> {
        let row = results.rows.get(self.selected_row()?)?;
        Some(row.join("\t"))
    }

    pub fn move_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected_row + 1 < self.row_count {
            self.selected_row += 1;
        }
    }

    pub fn move_left(&mut self) {
        self.selected_col = self.selected_col.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.selected_col + 1 < self.col_count {
            self.selected_col += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(self.page_height.get());
    }

    pub fn page_down(&mut self) {
        self.selected_row =
            (self.selected_row + self.page_height.get()).min(self.row_count.saturating_sub(1));
    }

    pub fn go_to_top(&mut self) {
        self.selected_row = 0;
    }

    pub fn go_to_bottom(&mut self) {
        self.selected_row = self.row_count.saturating_sub(1);
    }

    pub fn go_to_home(&mut self) {
        self.selected_col = 0;
        self.h_scroll_offset.set(0);
    }

    pub fn go_to_end(&mut self) {
        self.selected_col = self.col_count.saturating_sub(1);
    }

    fn width_of(&self, col: usize) -> u16 {
        self.col_widths.get(col).copied().unwrap_or(10)
    }

    /// First visible row so the selection stays on screen
    fn visible_from(&self, visible_height: usize) -> usize {
        let offset = self.scroll_offset.get();
        let offset = if self.selected_row < offset {
            self.selected_row
        } else if visible_height > 0 && self.selected_row >= offset + visible_height {
            self.selected_row + 1 - visible_height
        } else {
            offset
        };
        self.scroll_offset.set(offset);
        offset
    }

    /// First visible column so the column cursor stays on screen
    fn visible_col_from(&self, width: u16) -> usize {
        let mut hs = self.h_scroll_offset.get();
        if self.selected_col < hs {
            hs = self.selected_col;
        } else {
            let mut x: u16 = 0;
            let mut visible = false;
            for ci in hs..self.col_widths.len() {
                let w = self.width_of(ci);
                if ci == self.selected_col {
                    visible = x.saturating_add(w) <= width;
                    break;
                }
                x = x.saturating_add(w + 1);
                if x >= width {
                    break;
                }
            }
            if !visible {
                let mut new_hs = self.selected_col;
                let mut total = self.width_of(self.selected_col);
                while new_hs > 0 {
                    let prev = self.width_of(new_hs - 1);
                    if total + prev + 1 > width {
                        break;
                    }
                    total += prev + 1;
                    new_hs -= 1;
                }
                hs = new_hs;
            }
        }
        self.h_scroll_offset.set(hs);
        hs
    }

    /// Render the table with header and footer into `area`
    pub fn render(&self, frame: &mut Frame, area: Rect, results: &QueryResult, theme: &Theme) {
        if results.columns.is_empty() {
            let p = Paragraph::new("Query returned no columns").style(theme.results_empty);
            frame.render_widget(p, area);
            return;
        }
        if area.height < 2 || area.width < 5 {
            return;
        }

        // header + footer
        let visible_height = (area.height as usize).saturating_sub(2);
        self.page_height.set(visible_height.max(1));
        let scroll_offset = self.visible_from(visible_height);
        let h_scroll = self.visible_col_from(area.width);
        let right = area.x + area.width;

        let mut x = area.x;
        for (col_idx, name) in results.columns.iter().enumerate().skip(h_scroll) {
            if x >= right {
                break;
            }
            let w = self.width_of(col_idx).min(right - x);
            let style = if col_idx == self.selected_col {
                theme.results_header_selected
            } else {
                theme.results_header
            };
            frame.render_widget(
                Paragraph::new(fit(name, w as usize)).style(style),
                Rect::new(x, area.y, w, 1),
            );
            x += w + 1;
        }

        if results.rows.is_empty() {
            frame.render_widget(
                Paragraph::new("(no rows)").style(theme.results_empty),
                Rect::new(area.x, area.y + 1, area.width, 1),
            );
        }

        for vis_row in 0..visible_height {
            let row_idx = scroll_offset + vis_row;
            let Some(row) = results.rows.get(row_idx) else {
                break;
            };
            let y = area.y + 1 + vis_row as u16;
            let is_selected_row = row_idx == self.selected_row;
            let base = if is_selected_row {
                theme.results_selected_row
            } else if row_idx % 2 == 0 {
                theme.results_row_even
            } else {
                theme.results_row_odd
            };

            let mut x = area.x;
            for (col_idx, cell) in row.iter().enumerate().skip(h_scroll) {
                if x >= right {
                    break;
                }
                let w = self.width_of(col_idx).min(right - x);
                let style = if is_selected_row && col_idx == self.selected_col {
                    theme.results_selected
                } else {
                    base
                };
                // the gap after a cell keeps the row highlight continuous
                let gap = u16::from(x + w < right);
                frame.render_widget(
                    Paragraph::new(fit(cell, (w + gap) as usize)).style(style),
                    Rect::new(x, y, w + gap, 1),
                );
                x += w + 1;
            }
        }

        let footer = format!(
            "Row {}/{} | Col {}/{} | {:.1}ms",
            if self.row_count == 0 { 0 } else { self.selected_row + 1 },
            self.row_count,
            self.selected_col + 1,
            self.col_count,
            results.execution_time.as_secs_f64() * 1000.0,
        );
        frame.render_widget(
            Paragraph::new(footer).style(theme.results_footer),
            Rect::new(area.x, area.y + area.height - 1, area.width, 1),
        );
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

/// Column widths by display width of header and the first rows
fn compute_column_widths(results: &QueryResult) -> Vec<u16> {
    let mut widths: Vec<usize> = results.columns.iter().map(|c| c.width() + 1).collect();

    for row in results.rows.iter().take(100) {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width() + 1);
        }
    }

    widths
        .into_iter()
        .map(|w| (w.min(MAX_COL_WIDTH as usize) as u16).max(MIN_COL_WIDTH))
        .collect()
}

/// Truncate `s` to `width` display columns and pad it to exactly that width
fn fit(s: &str, width: usize) -> String {
    let (text, used) = s.unicode_truncate(width);
    let mut out = String::with_capacity(text.len() + width - used);
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}
