//! Single-key questions on the plain terminal
//!
//! Used while the table view is suspended (after the editor exits), so it
//! writes to stdout directly and reads one key in raw mode.

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use std::io::{self, Write};

/// One accepted answer
#[derive(Debug, Clone, Copy)]
pub struct Choice {
    pub key: char,
    pub help: &'static str,
}

fn read_char() -> io::Result<char> {
    terminal::enable_raw_mode()?;
    let key = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char(c) => break Ok(c),
                KeyCode::Enter => break Ok('\n'),
                KeyCode::Esc => break Ok('\u{1b}'),
                _ => {}
            },
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;
    key
}

/// Text shown for a set of choices, e.g. `[eQ?]`
pub fn choice_keys(choices: &[Choice]) -> String {
    let keys: String = choices.iter().map(|c| c.key).collect();
    format!("[{}?]", keys)
}

/// Ask until one of `choices` is typed; `?` lists them.
pub fn ask(message: &str, choices: &[Choice]) -> io::Result<char> {
    let keys = choice_keys(choices);
    let mut out = io::stdout();
    loop {
        write!(out, "{} {} ", message, keys)?;
        out.flush()?;
        let c = read_char()?;
        writeln!(out, "{}", c.escape_default())?;

        if choices.iter().any(|choice| choice.key == c) {
            return Ok(c);
        }
        if c == '?' {
            writeln!(out, "Commands:")?;
            for choice in choices {
                writeln!(out, "  {} -- {}", choice.key, choice.help)?;
            }
            writeln!(out, "  ? -- this help")?;
            continue;
        }
        writeln!(out, "Please enter one of {}", keys)?;
        writeln!(out, "  (Type '?' for help.)")?;
    }
}

/// Choices offered after a rejected edit
pub const AFTER_ERROR: [Choice; 2] = [
    Choice {
        key: 'e',
        help: "open editor again",
    },
    Choice {
        key: 'Q',
        help: "discard changes",
    },
];

/// Report an edit error and ask whether to edit again
pub fn ask_edit_again(error: &dyn std::fmt::Display) -> io::Result<bool> {
    println!("Error: {}", error);
    Ok(ask("What now?", &AFTER_ERROR)? == 'e')
}
