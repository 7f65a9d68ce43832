//! Terminal event loop
//!
//! Owns the terminal and the [`Session`]. Each turn draws a frame, waits
//! briefly for input, lets [`App`] turn it into an [`Action`] and performs
//! that action against the database. The row editor runs with the table
//! view suspended.

use crate::app::{Action, App, AppEvent, StatusLevel};
use crate::config::{EditFormat, ErrorPolicy, StatementKind};
use crate::db::Database;
use crate::editor::{EditBuffer, edit_buffer};
use crate::error::{DbError, Result, SqlviewError};
use crate::prompt;
use crate::session::{PageInvocation, Session};
use crate::ui::render::render;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// How long one turn waits for input before checking the connection again
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Row editor settings
#[derive(Debug, Clone)]
pub struct EditOptions {
    /// Editor commands tried in order
    pub candidates: Vec<String>,
    pub format: EditFormat,
}

/// Interactive session driver
pub struct Runtime<D: Database> {
    session: Session<D>,
    app: App,
    edit: EditOptions,
    policy: ErrorPolicy,
    conn_errors: mpsc::UnboundedReceiver<String>,
}

fn init_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Leave raw mode and the alternate screen on panic so the message is readable
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

impl<D: Database> Runtime<D> {
    pub fn new(
        session: Session<D>,
        app: App,
        edit: EditOptions,
        policy: ErrorPolicy,
        conn_errors: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self {
            session,
            app,
            edit,
            policy,
            conn_errors,
        }
    }

    /// Run until the user quits. The terminal is restored on every exit path.
    pub async fn run(mut self) -> Result<()> {
        install_panic_hook();
        let mut terminal = init_terminal()?;
        let outcome = self.event_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        outcome
    }

    async fn event_loop(&mut self, terminal: &mut Term) -> Result<()> {
        self.app.show_page(self.session.result());

        while self.app.running {
            if let Ok(message) = self.conn_errors.try_recv() {
                tracing::error!(%message, "database connection lost");
                return Err(DbError::ConnectionFailed(message).into());
            }

            terminal.draw(|frame| {
                render(
                    frame,
                    &self.app,
                    self.session.invocation(),
                    self.session.result(),
                )
            })?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let event = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Event::Resize(..) => AppEvent::Resize,
                _ => continue,
            };

            let action = self.app.handle_event(event, &self.session);
            self.perform(action, terminal).await?;
        }
        Ok(())
    }

    async fn perform(&mut self, action: Action, terminal: &mut Term) -> Result<()> {
        match action {
            Action::None => {}
            Action::Quit => self.app.running = false,
            Action::Goto(invocation) => self.goto(invocation).await?,
            Action::Reload => match self.session.reload().await {
                Ok(()) => {
                    self.app.refresh_page(self.session.result());
                    self.app.set_status("Reloaded".to_string(), StatusLevel::Info);
                }
                Err(e) => self.report(&e),
            },
            Action::Edit { row } => {
                let result = self.session.result();
                let Some(values) = result.source_values(row) else {
                    return Ok(());
                };
                let buffer = EditBuffer::from_row(&result.columns, values);
                match self.edit_in_editor(&buffer, terminal)? {
                    Some(edited) if edited == buffer => {
                        self.app.set_status("No changes".to_string(), StatusLevel::Info);
                    }
                    Some(edited) => self.commit(StatementKind::Update, &edited.to_args()).await,
                    None => {}
                }
            }
            Action::Insert => {
                let result = self.session.result();
                let sample = result.values.first().map(Vec::as_slice);
                let buffer = EditBuffer::blank(&result.columns, sample);
                if let Some(edited) = self.edit_in_editor(&buffer, terminal)? {
                    self.commit(StatementKind::Insert, &edited.to_args()).await;
                }
            }
            Action::Delete { row } => {
                let result = self.session.result();
                let Some(values) = result.source_values(row) else {
                    return Ok(());
                };
                let args = EditBuffer::from_row(&result.columns, values).to_args();
                self.commit(StatementKind::Delete, &args).await;
            }
        }
        Ok(())
    }

    /// Switch pages. A failed select follows the failure policy; a
    /// destination the highlighted row cannot fill only fails the key.
    async fn goto(&mut self, invocation: PageInvocation) -> Result<()> {
        match self.session.transition(invocation.clone()).await {
            Ok(()) => {
                self.app.show_page(self.session.result());
                Ok(())
            }
            Err(e @ SqlviewError::Bind(_)) => {
                tracing::warn!(page = %invocation, error = %e, "destination not applicable");
                self.app.set_status(e.to_string(), StatusLevel::Error);
                Ok(())
            }
            Err(e) => {
                tracing::error!(page = %invocation, error = %e, "page transition failed");
                match self.policy {
                    ErrorPolicy::Quit => Err(e),
                    ErrorPolicy::Keep => {
                        self.app.set_status(e.to_string(), StatusLevel::Error);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Run a row statement and show the outcome
    async fn commit(&mut self, kind: StatementKind, args: &[String]) {
        match self.session.commit(kind, args).await {
            Ok(committed) => {
                self.app.refresh_page(self.session.result());
                let done = format!("{}: {} row(s) affected", kind, committed.affected);
                match committed.reload_error {
                    None => self.app.set_status(done, StatusLevel::Success),
                    Some(e) => self
                        .app
                        .set_status(format!("{}, reload failed: {}", done, e), StatusLevel::Warning),
                }
            }
            Err(e) => self.report(&e),
        }
    }

    fn report(&mut self, e: &SqlviewError) {
        tracing::error!(error = %e, "operation failed");
        self.app.set_status(e.to_string(), StatusLevel::Error);
    }

    /// Suspend the table view and edit `buffer` in an external editor.
    ///
    /// Returns `None` when the edit was discarded or failed; failures are
    /// reported in the status line.
    fn edit_in_editor(&mut self, buffer: &EditBuffer, terminal: &mut Term) -> Result<Option<EditBuffer>> {
        restore_terminal(terminal)?;
        let outcome = edit_buffer(buffer, self.edit.format, &self.edit.candidates, |e| {
            prompt::ask_edit_again(e)
        });
        enable_raw_mode()?;
        execute!(terminal.backend_mut(), EnterAlternateScreen)?;
        terminal.clear()?;

        match outcome {
            Ok(Some(edited)) => Ok(Some(edited)),
            Ok(None) => {
                self.app.set_status("Edit discarded".to_string(), StatusLevel::Info);
                Ok(None)
            }
            Err(e) => {
                self.report(&e.into());
                Ok(None)
            }
        }
    }
}
