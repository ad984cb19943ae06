//! Error types for ccquery-db.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for compilation-database queries.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors that can occur while loading or querying a compilation database.
#[derive(Error, Diagnostic, Debug)]
pub enum QueryError {
    /// No compilation database could be discovered.
    #[error("No compilation database found starting from {}", .start.display())]
    #[diagnostic(
        code(ccquery::not_found),
        help("generate one with `cmake -DCMAKE_EXPORT_COMPILE_COMMANDS=ON` or pass --database")
    )]
    NotFound { start: PathBuf },

    /// The database as a whole could not be used.
    #[error("Malformed compilation database {}: {reason}", .path.display())]
    #[diagnostic(code(ccquery::malformed_database))]
    MalformedDatabase { path: PathBuf, reason: String },

    /// A single entry could not be used; other entries stay usable.
    #[error("Malformed compilation database entry #{index}: {reason}")]
    #[diagnostic(code(ccquery::malformed_record))]
    MalformedRecord { index: usize, reason: String },

    /// The queried file is not part of the database.
    #[error("No translation unit for {}", .0.display())]
    #[diagnostic(code(ccquery::no_match), severity(Advice))]
    NoMatch(PathBuf),

    /// Failed to read a file.
    #[error("Failed to read {}: {source}", .path.display())]
    #[diagnostic(code(ccquery::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    #[diagnostic(code(ccquery::config))]
    Config(#[from] toml::de::Error),
}

impl QueryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QueryError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error merely means "no information available".
    pub fn is_no_match(&self) -> bool {
        matches!(self, QueryError::NoMatch(_))
    }
}
