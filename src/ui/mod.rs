//! Terminal UI components
//!
//! All UI widgets and rendering logic using ratatui.

pub mod help;
pub mod layout;
pub mod render;
pub mod table;
pub mod theme;
