//! Per-file compiler flags from a compilation database.
//!
//! This crate provides:
//! - compile_commands.json discovery and loading
//! - Translation-unit resolution by normalized path
//! - Argument classification into include directories, bookkeeping
//!   tokens and generic options
//! - Include/option extraction and the string-returning host operations
//!
//! # Example
//!
//! ```no_run
//! use ccquery_db::{boundary, QueryConfig, Session};
//! use std::path::Path;
//!
//! let session = Session::load(Path::new("src/main.cc"), QueryConfig::default())?;
//! let flags = boundary::get_includes_and_options(&session, Path::new("src/main.cc"));
//! println!("{}", flags);
//! # Ok::<(), ccquery_db::QueryError>(())
//! ```

mod aggregate;
mod classify;
mod compile_commands;
mod config;
mod error;
mod resolve;
mod session;
mod tokenize;

pub mod boundary;
pub mod editor;
pub mod path;

pub use aggregate::{extract_all, extract_includes, extract_options, IncludeSet, OptionString};
pub use classify::{classify, Classification, Classified, IncludeSpelling, INCLUDE_FLAG};
pub use compile_commands::{locate, CompilationDatabase, CompileCommand, TranslationUnitRecord};
pub use config::{ClassifyConfig, DatabaseConfig, EditorConfig, MatchPolicy, QueryConfig, ResolveConfig};
pub use error::{QueryError, Result};
pub use resolve::{is_header, resolve, resolve_with_fallback, ResolvedMatch};
pub use session::{Session, SharedSession};
pub use tokenize::{split_command, TokenizeError};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shareable_between_threads() {
        assert_send_sync::<CompilationDatabase>();
        assert_send_sync::<Session>();
        assert_send_sync::<SharedSession>();
    }
}
