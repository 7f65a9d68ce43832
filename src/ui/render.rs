//! Top-level render function
//!
//! Title line on top, the page table in the middle, status line at the
//! bottom, and the help overlay over everything when open.

use crate::app::{App, Mode, StatusLevel};
use crate::db::QueryResult;
use crate::session::PageInvocation;
use crate::ui::layout::calculate_layout;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Render the entire application
pub fn render(frame: &mut Frame, app: &App, invocation: &PageInvocation, result: &QueryResult) {
    let theme = &app.theme;
    let layout = calculate_layout(frame.area());

    frame.render_widget(
        Paragraph::new(title_line(app, invocation, theme)),
        layout.title,
    );

    app.table.render(frame, layout.table, result, theme);

    render_status_bar(frame, layout.status, app, theme);

    if app.mode == Mode::Help {
        app.help.render(frame, frame.area(), theme);
    }
}

/// `page arg... | user@host/db`
fn title_line<'a>(app: &'a App, invocation: &'a PageInvocation, theme: &Theme) -> Line<'a> {
    let mut spans = vec![Span::styled(invocation.page.as_str(), theme.title_page)];
    for arg in &invocation.args {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(arg.as_str(), theme.title_args));
    }
    spans.push(Span::styled(
        format!("  [{}]", app.connection_name),
        theme.title_connection,
    ));
    Line::from(spans)
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let paragraph = if let Some(ref status) = app.status_message {
        let style = match status.level {
            StatusLevel::Info => theme.status_info,
            StatusLevel::Success => theme.status_success,
            StatusLevel::Warning => theme.status_warning,
            StatusLevel::Error => theme.status_error,
        };
        Paragraph::new(status.message.as_str()).style(style)
    } else {
        Paragraph::new("Press ? for help, q to quit").style(theme.status_hint)
    };
    frame.render_widget(paragraph, area);
}
