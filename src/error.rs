//! Error types for sqlview
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors with clear error chains.

use std::io;

/// Main error type for the sqlview application
#[derive(Debug, thiserror::Error)]
pub enum SqlviewError {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Placeholder errors that escaped load-time validation
    #[error("Bind error: {0}")]
    Bind(#[from] BindError),

    /// Connection-level database errors
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// Statement execution errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Malformed import text
    #[error("Format error: {0}")]
    Codec(#[from] CodecError),

    /// External editor failures
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Database operation errors
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Failed to establish connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement preparation or execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// A string argument could not be converted to the parameter type
    #[error("Parameter ${index} ({type_name}): cannot convert {value:?}: {reason}")]
    TypeConversion {
        index: usize,
        type_name: String,
        value: String,
        reason: String,
    },

    /// Statement expects a different number of parameters than supplied
    #[error("Statement expects {expected} parameters, got {found}")]
    ParameterCount { expected: usize, found: usize },
}

/// A failed statement, together with what was sent to the server
#[derive(Debug, thiserror::Error)]
#[error("{source} <{query:?}, {args:?}>")]
pub struct QueryError {
    pub query: String,
    pub args: Vec<String>,
    #[source]
    pub source: DbError,
}

impl QueryError {
    pub fn new(query: impl Into<String>, args: &[String], source: DbError) -> Self {
        Self {
            query: query.into(),
            args: args.to_vec(),
            source,
        }
    }
}

/// Placeholder translation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// `$` not followed by a 1-based index
    #[error("placeholder at byte {offset} has no index")]
    MissingIndex { offset: usize },

    /// `$n` with n == 0 or n larger than the available arguments
    #[error("placeholder ${index} at byte {offset} is out of range ({available} arguments)")]
    OutOfRange {
        index: usize,
        available: usize,
        offset: usize,
    },
}

/// Configuration loading/validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Config file could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to parse YAML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Referenced page is not defined
    #[error("Page '{0}' not found")]
    PageNotFound(String),

    /// Page cannot become active
    #[error("Page '{0}' has no select query")]
    NoSelect(String),

    /// Page has no template for an edit command
    #[error("Page '{page}' has no {kind} query")]
    NoTemplate { page: String, kind: String },

    /// Key specifier could not be parsed
    #[error("Page '{page}': invalid key '{key}'")]
    InvalidKey { page: String, key: String },

    /// Template placeholder cannot be satisfied
    #[error("Page '{page}', {context}: {source}")]
    Template {
        page: String,
        context: String,
        #[source]
        source: BindError,
    },
}

/// Table text decoding errors. Every variant carries a 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("no columns to read")]
    NoColumns,

    #[error("no table found after reading {line} lines of text")]
    NoTable { line: usize },

    #[error("wrong header for table in line {line}")]
    BadHeader { line: usize },

    #[error("no table found after header in line {line}")]
    MissingRule { line: usize },

    #[error("wrong number of columns in line {line}: expected {expected}, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("wrong section header in line {line}")]
    SectionHeader { line: usize },

    #[error("syntax error in line {line}")]
    Syntax { line: usize },

    #[error("line {line}: unknown key {key:?}")]
    UnknownKey { line: usize, key: String },

    #[error("expected exactly one record, found {found} (line {line})")]
    RecordCount { line: usize, found: usize },
}

impl CodecError {
    /// Line the error refers to (0 when not tied to a line)
    pub fn line(&self) -> usize {
        match self {
            CodecError::NoColumns => 0,
            CodecError::NoTable { line }
            | CodecError::BadHeader { line }
            | CodecError::MissingRule { line }
            | CodecError::ColumnCount { line, .. }
            | CodecError::SectionHeader { line }
            | CodecError::Syntax { line }
            | CodecError::UnknownKey { line, .. }
            | CodecError::RecordCount { line, .. } => *line,
        }
    }
}

/// External editor errors
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// None of the candidate binaries could be launched
    #[error("no editor found (tried {})", .tried.join(", "))]
    NotFound { tried: Vec<String> },

    /// Editor started but exited unsuccessfully
    #[error("editor '{program}' failed: {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },

    /// Temp file handling
    #[error("edit file: {0}")]
    Io(#[from] io::Error),

    /// Edited YAML document is not valid
    #[error("cannot parse edited text: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Edited YAML document has an unexpected shape
    #[error("edited text: {0}")]
    Document(String),

    /// Edited table text is malformed
    #[error("edited text: {0}")]
    Codec(#[from] CodecError),
}

impl EditorError {
    /// Whether re-opening the editor could fix the problem
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EditorError::Parse(_) | EditorError::Document(_) | EditorError::Codec(_)
        )
    }
}

/// Specialized Result type for sqlview operations
pub type Result<T> = std::result::Result<T, SqlviewError>;

/// Specialized Result type for database operations
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Specialized Result type for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized Result type for placeholder translation
pub type BindResult<T> = std::result::Result<T, BindError>;

/// Specialized Result type for table codecs
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Specialized Result type for the editor flow
pub type EditorResult<T> = std::result::Result<T, EditorError>;
