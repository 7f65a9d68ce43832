//! Data-driven keybinding configuration
//!
//! Built-in bindings are defined as data in `KeyMap::default()`, not as match
//! arms scattered across components. Page bindings from the configuration
//! are parsed with [`KeyBind::parse`] into the same `KeyBind` type, so the
//! table view can check them first and fall back to the built-ins.

use crate::app::Mode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use std::fmt;

/// A key combination (code + modifiers)
///
/// Shift is folded into the character for `Char` keys, so `G` typed with
/// shift and `G` written in a config file compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) | KeyCode::BackTab => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Parse a key specifier: `enter`, `tab`, `esc`, `backspace`, `delete`,
    /// `space`, arrows, `home`/`end`, `pageup`/`pagedown`, `f1`..`f12`, or a
    /// single character, optionally prefixed with `ctrl+` and/or `alt+`.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut rest = spec;
        let mut modifiers = KeyModifiers::NONE;
        loop {
            let lower = rest.to_ascii_lowercase();
            if rest.chars().count() > 1 && lower.starts_with("ctrl+") {
                modifiers |= KeyModifiers::CONTROL;
                rest = &rest[5..];
            } else if rest.chars().count() > 1 && lower.starts_with("alt+") {
                modifiers |= KeyModifiers::ALT;
                rest = &rest[4..];
            } else {
                break;
            }
        }

        let mut chars = rest.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => KeyCode::Char(c),
            _ => match rest.to_ascii_lowercase().as_str() {
                "enter" | "return" => KeyCode::Enter,
                "tab" => KeyCode::Tab,
                "esc" | "escape" => KeyCode::Esc,
                "backspace" => KeyCode::Backspace,
                "delete" | "del" => KeyCode::Delete,
                "space" => KeyCode::Char(' '),
                "up" => KeyCode::Up,
                "down" => KeyCode::Down,
                "left" => KeyCode::Left,
                "right" => KeyCode::Right,
                "home" => KeyCode::Home,
                "end" => KeyCode::End,
                "pageup" => KeyCode::PageUp,
                "pagedown" => KeyCode::PageDown,
                name => {
                    let n: u8 = name.strip_prefix('f')?.parse().ok()?;
                    if !(1..=12).contains(&n) {
                        return None;
                    }
                    KeyCode::F(n)
                }
            },
        };
        Some(Self::new(code, modifiers))
    }
}

impl From<KeyEvent> for KeyBind {
    fn from(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }
}

impl fmt::Display for KeyBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Delete => f.write_str("delete"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pageup"),
            KeyCode::PageDown => f.write_str("pagedown"),
            KeyCode::F(n) => write!(f, "f{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Semantic key actions: what a key means, not which key it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Global
    Quit,
    ShowHelp,
    Reload,

    // Navigation (shared by table and help)
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Home,
    End,

    // Table-specific
    CopyRow,
    CopyPage,
    EditRow,
    NewRow,
    DeleteRow,

    // Modal dismiss/answer
    Dismiss,
    Confirm,
    Cancel,
}

impl KeyAction {
    /// One-line description for the help overlay
    pub fn description(self) -> &'static str {
        match self {
            KeyAction::Quit => "quit",
            KeyAction::ShowHelp => "toggle this help",
            KeyAction::Reload => "reload the page",
            KeyAction::MoveUp => "previous row",
            KeyAction::MoveDown => "next row",
            KeyAction::MoveLeft => "scroll columns left",
            KeyAction::MoveRight => "scroll columns right",
            KeyAction::PageUp => "page up",
            KeyAction::PageDown => "page down",
            KeyAction::GoToTop => "first row",
            KeyAction::GoToBottom => "last row",
            KeyAction::Home => "first column",
            KeyAction::End => "last column",
            KeyAction::CopyRow => "copy row (tab separated)",
            KeyAction::CopyPage => "copy page",
            KeyAction::EditRow => "edit row",
            KeyAction::NewRow => "new row",
            KeyAction::DeleteRow => "delete row",
            KeyAction::Dismiss => "dismiss",
            KeyAction::Confirm => "confirm",
            KeyAction::Cancel => "cancel",
        }
    }
}

/// Keybinding configuration. Maps key combos to semantic actions per mode.
pub struct KeyMap {
    /// Bindings that apply in every mode (checked first)
    global: HashMap<KeyBind, KeyAction>,
    /// Per-mode bindings (checked after global)
    modes: HashMap<Mode, HashMap<KeyBind, KeyAction>>,
}

impl KeyMap {
    /// Resolve a key event to a semantic action.
    /// Checks global bindings first, then mode-specific bindings.
    pub fn resolve(&self, mode: Mode, key: KeyEvent) -> Option<KeyAction> {
        let bind = KeyBind::from(key);
        if let Some(action) = self.global.get(&bind) {
            return Some(*action);
        }
        self.modes.get(&mode).and_then(|m| m.get(&bind)).copied()
    }

    /// Built-in bindings of a mode (including global ones), sorted for display
    pub fn bindings(&self, mode: Mode) -> Vec<(KeyBind, KeyAction)> {
        let mut list: Vec<(KeyBind, KeyAction)> = self
            .global
            .iter()
            .chain(self.modes.get(&mode).into_iter().flatten())
            .map(|(k, a)| (*k, *a))
            .collect();
        list.sort_by_key(|(k, a)| (*a as u8, k.to_string()));
        list
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut global = HashMap::new();
        global.insert(KeyBind::ctrl('c'), KeyAction::Quit);

        let mut modes = HashMap::new();

        // ── Table ────────────────────────────────────────────────
        let mut table = HashMap::new();
        insert_vim_nav(&mut table);
        table.insert(KeyBind::char('q'), KeyAction::Quit);
        table.insert(KeyBind::char('?'), KeyAction::ShowHelp);
        table.insert(KeyBind::ctrl('r'), KeyAction::Reload);
        table.insert(KeyBind::char('y'), KeyAction::CopyRow);
        table.insert(KeyBind::char('Y'), KeyAction::CopyPage);
        table.insert(KeyBind::char('E'), KeyAction::EditRow);
        table.insert(KeyBind::char('N'), KeyAction::NewRow);
        table.insert(KeyBind::char('D'), KeyAction::DeleteRow);
        table.insert(KeyBind::plain(KeyCode::Esc), KeyAction::Dismiss);
        modes.insert(Mode::Table, table);

        // ── Help ─────────────────────────────────────────────────
        let mut help = HashMap::new();
        insert_scroll_nav(&mut help);
        help.insert(KeyBind::plain(KeyCode::Esc), KeyAction::Dismiss);
        help.insert(KeyBind::char('?'), KeyAction::Dismiss);
        help.insert(KeyBind::char('q'), KeyAction::Dismiss);
        modes.insert(Mode::Help, help);

        // ── Delete confirmation ──────────────────────────────────
        let mut confirm = HashMap::new();
        confirm.insert(KeyBind::char('y'), KeyAction::Confirm);
        confirm.insert(KeyBind::char('Y'), KeyAction::Confirm);
        confirm.insert(KeyBind::char('n'), KeyAction::Cancel);
        confirm.insert(KeyBind::char('N'), KeyAction::Cancel);
        confirm.insert(KeyBind::plain(KeyCode::Esc), KeyAction::Cancel);
        modes.insert(Mode::ConfirmDelete, confirm);

        Self { global, modes }
    }
}

/// Insert vim-style navigation bindings (arrows + hjkl + page + g/G + Home/End)
fn insert_vim_nav(map: &mut HashMap<KeyBind, KeyAction>) {
    insert_scroll_nav(map);

    map.insert(KeyBind::plain(KeyCode::Right), KeyAction::MoveRight);
    map.insert(KeyBind::char('l'), KeyAction::MoveRight);
    map.insert(KeyBind::plain(KeyCode::Left), KeyAction::MoveLeft);
    map.insert(KeyBind::char('h'), KeyAction::MoveLeft);
    map.insert(KeyBind::plain(KeyCode::Home), KeyAction::Home);
    map.insert(KeyBind::plain(KeyCode::End), KeyAction::End);
}

/// Insert vertical navigation bindings (arrows + jk + page + g/G)
fn insert_scroll_nav(map: &mut HashMap<KeyBind, KeyAction>) {
    map.insert(KeyBind::plain(KeyCode::Down), KeyAction::MoveDown);
    map.insert(KeyBind::char('j'), KeyAction::MoveDown);
    map.insert(KeyBind::plain(KeyCode::Up), KeyAction::MoveUp);
    map.insert(KeyBind::char('k'), KeyAction::MoveUp);
    map.insert(KeyBind::plain(KeyCode::PageDown), KeyAction::PageDown);
    map.insert(KeyBind::plain(KeyCode::PageUp), KeyAction::PageUp);
    map.insert(KeyBind::char('g'), KeyAction::GoToTop);
    map.insert(KeyBind::char('G'), KeyAction::GoToBottom);
    map.insert(KeyBind::plain(KeyCode::Home), KeyAction::GoToTop);
    map.insert(KeyBind::plain(KeyCode::End), KeyAction::GoToBottom);
}
