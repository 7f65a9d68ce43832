//! Application state and event handling
//!
//! Central state machine: events come in, state updates, actions go out.
//! Anything that touches the database or the terminal outside the frame
//! (page loads, the row editor) is returned as an [`Action`] for the
//! runtime to perform.

use crate::codec::Format;
use crate::config::StatementKind;
use crate::db::{Database, QueryResult};
use crate::error::ConfigError;
use crate::keymap::{KeyAction, KeyBind, KeyMap};
use crate::session::{PageInvocation, Resolution, Session};
use crate::ui::help::HelpOverlay;
use crate::ui::table::TableView;
use crate::ui::theme::Theme;
use crossterm::event::KeyEvent;

/// Main application state
pub struct App {
    /// Display name of the connection (`user@host/db`)
    pub connection_name: String,

    /// Which view receives keys
    pub mode: Mode,

    /// UI components
    pub table: TableView,
    pub help: HelpOverlay,

    /// Display row waiting for delete confirmation
    pending_delete: Option<usize>,

    /// Format used when copying a whole page
    pub format: Format,

    /// Data-driven keybinding configuration
    pub keymap: KeyMap,

    /// UI theme (created once, reused every frame)
    pub theme: Theme,

    /// Status message to display
    pub status_message: Option<StatusMessage>,

    /// Clipboard handle, opened on first copy and kept alive afterwards
    clipboard: Option<arboard::Clipboard>,

    /// Whether the application is running
    pub running: bool,
}

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Table,
    Help,
    ConfirmDelete,
}

/// Status message with severity level
pub struct StatusMessage {
    pub message: String,
    pub level: StatusLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Application events from the event loop
pub enum AppEvent {
    /// Keyboard input event
    Key(KeyEvent),
    /// Terminal resize event
    Resize,
}

/// Actions returned by event handlers for the main loop to execute
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// Switch to another page
    Goto(PageInvocation),
    /// Run the active page's select again
    Reload,
    /// Edit the database row behind this display row
    Edit { row: usize },
    /// Create a new row
    Insert,
    /// Delete the database row behind this display row (already confirmed)
    Delete { row: usize },
    Quit,
    None,
}

impl App {
    pub fn new(connection_name: impl Into<String>, format: Format) -> Self {
        Self {
            connection_name: connection_name.into(),
            mode: Mode::Table,
            table: TableView::new(),
            help: HelpOverlay::new(),
            pending_delete: None,
            format,
            keymap: KeyMap::default(),
            theme: Theme::default(),
            status_message: None,
            clipboard: None,
            running: true,
        }
    }

    /// Handle an application event and return the resulting action
    pub fn handle_event<D: Database>(&mut self, event: AppEvent, session: &Session<D>) -> Action {
        match event {
            AppEvent::Key(key) => self.handle_key(key, session),
            AppEvent::Resize => Action::None,
        }
    }

    fn handle_key<D: Database>(&mut self, key: KeyEvent, session: &Session<D>) -> Action {
        if self.mode != Mode::ConfirmDelete {
            self.status_message = None;
        }

        // Page bindings take priority over the built-in table keys
        if self.mode == Mode::Table {
            let row = self
                .table
                .selected_row()
                .and_then(|r| session.result().rows.get(r))
                .map(Vec::as_slice);
            match session.resolve_key(KeyBind::from(key), row) {
                Ok(Resolution::Goto(invocation)) => return Action::Goto(invocation),
                Ok(Resolution::PassThrough) => {}
                Err(e) => {
                    tracing::warn!(key = %KeyBind::from(key), error = %e, "page key not applicable");
                    self.set_status(format!("Key {}: {}", KeyBind::from(key), e), StatusLevel::Error);
                    return Action::None;
                }
            }
        }

        match self.keymap.resolve(self.mode, key) {
            Some(key_action) => self.execute_key_action(key_action, session),
            None => Action::None,
        }
    }

    fn execute_key_action<D: Database>(&mut self, action: KeyAction, session: &Session<D>) -> Action {
        match action {
            // ── Global ───────────────────────────────────────
            KeyAction::Quit => Action::Quit,
            KeyAction::ShowHelp => {
                self.show_help(session);
                Action::None
            }
            KeyAction::Reload => Action::Reload,

            // ── Navigation ───────────────────────────────────
            KeyAction::MoveUp => {
                match self.mode {
                    Mode::Table => self.table.move_up(),
                    Mode::Help => self.help.scroll_up(),
                    Mode::ConfirmDelete => {}
                }
                Action::None
            }
            KeyAction::MoveDown => {
                match self.mode {
                    Mode::Table => self.table.move_down(),
                    Mode::Help => self.help.scroll_down(),
                    Mode::ConfirmDelete => {}
                }
                Action::None
            }
            KeyAction::MoveLeft => {
                self.table.move_left();
                Action::None
            }
            KeyAction::MoveRight => {
                self.table.move_right();
                Action::None
            }
            KeyAction::PageUp => {
                match self.mode {
                    Mode::Table => self.table.page_up(),
                    Mode::Help => self.help.page_up(),
                    Mode::ConfirmDelete => {}
                }
                Action::None
            }
            KeyAction::PageDown => {
                match self.mode {
                    Mode::Table => self.table.page_down(),
                    Mode::Help => self.help.page_down(),
                    Mode::ConfirmDelete => {}
                }
                Action::None
            }
            KeyAction::GoToTop => {
                match self.mode {
                    Mode::Table => self.table.go_to_top(),
                    Mode::Help => self.help.scroll_to_top(),
                    Mode::ConfirmDelete => {}
                }
                Action::None
            }
            KeyAction::GoToBottom => {
                match self.mode {
                    Mode::Table => self.table.go_to_bottom(),
                    Mode::Help => self.help.scroll_to_bottom(),
                    Mode::ConfirmDelete => {}
                }
                Action::None
            }
            KeyAction::Home => {
                self.table.go_to_home();
                Action::None
            }
            KeyAction::End => {
                self.table.go_to_end();
                Action::None
            }

            // ── Table ────────────────────────────────────────
            KeyAction::CopyRow => {
                if let Some(text) = self.table.selected_row_text(session.result()) {
                    self.copy_to_clipboard(&text, "row");
                }
                Action::None
            }
            KeyAction::CopyPage => {
                let result = session.result();
                let text = self.format.encode(&result.columns, &result.rows);
                self.copy_to_clipboard(&text, "page");
                Action::None
            }
            KeyAction::EditRow => {
                if !self.supports(session, StatementKind::Update) {
                    return Action::None;
                }
                match self.table.selected_row() {
                    Some(row) => Action::Edit { row },
                    None => {
                        self.set_status("No row to edit".to_string(), StatusLevel::Warning);
                        Action::None
                    }
                }
            }
            KeyAction::NewRow => {
                if self.supports(session, StatementKind::Insert) {
                    Action::Insert
                } else {
                    Action::None
                }
            }
            KeyAction::DeleteRow => {
                if !self.supports(session, StatementKind::Delete) {
                    return Action::None;
                }
                match self.table.selected_row() {
                    Some(row) => {
                        self.pending_delete = Some(row);
                        self.mode = Mode::ConfirmDelete;
                        self.set_status(format!("Delete row {}? (y/n)", row + 1), StatusLevel::Warning);
                    }
                    None => self.set_status("No row to delete".to_string(), StatusLevel::Warning),
                }
                Action::None
            }

            // ── Modal (help, delete confirmation) ────────────
            KeyAction::Dismiss => {
                if self.mode == Mode::Help {
                    self.help.hide();
                    self.mode = Mode::Table;
                }
                Action::None
            }
            KeyAction::Confirm => {
                self.mode = Mode::Table;
                self.status_message = None;
                match self.pending_delete.take() {
                    Some(row) => Action::Delete { row },
                    None => Action::None,
                }
            }
            KeyAction::Cancel => {
                self.mode = Mode::Table;
                self.pending_delete = None;
                self.set_status("Delete cancelled".to_string(), StatusLevel::Info);
                Action::None
            }
        }
    }

    fn show_help<D: Database>(&mut self, session: &Session<D>) {
        let builtin = self
            .keymap
            .bindings(Mode::Table)
            .into_iter()
            .map(|(key, action)| (key.to_string(), action.description().to_string()))
            .collect();
        let page = session
            .page()
            .map(|page| (page.name.as_str(), page.binding_descriptions()));
        self.help.show(builtin, page);
        self.mode = Mode::Help;
    }

    /// Whether the active page has a template for `kind`; reports it if not
    fn supports<D: Database>(&mut self, session: &Session<D>, kind: StatementKind) -> bool {
        let page = &session.invocation().page;
        if session.page().and_then(|p| p.template(kind)).is_some() {
            return true;
        }
        let err = ConfigError::NoTemplate {
            page: page.clone(),
            kind: kind.to_string(),
        };
        self.set_status(err.to_string(), StatusLevel::Warning);
        false
    }

    /// A different page was loaded
    pub fn show_page(&mut self, result: &QueryResult) {
        self.table.set_results(result);
        self.mode = Mode::Table;
    }

    /// The current page was loaded again
    pub fn refresh_page(&mut self, result: &QueryResult) {
        self.table.refresh(result);
    }

    pub fn set_status(&mut self, message: String, level: StatusLevel) {
        self.status_message = Some(StatusMessage { message, level });
    }

    fn copy_to_clipboard(&mut self, text: &str, what: &str) {
        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    self.set_status(format!("Clipboard unavailable: {}", e), StatusLevel::Warning);
                    return;
                }
            }
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return;
        };
        match clipboard.set_text(text) {
            Ok(()) => self.set_status(format!("Copied {} to clipboard", what), StatusLevel::Success),
            Err(e) => self.set_status(format!("Clipboard error: {}", e), StatusLevel::Warning),
        }
    }
}
