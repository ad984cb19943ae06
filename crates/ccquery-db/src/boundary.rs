//! String-returning operations for hosts without an error channel.
//!
//! Every failure collapses to an empty string here and nowhere else. Errors
//! are logged; a file missing from the database is a normal empty answer.

use crate::session::Session;
use crate::Result;
use std::path::Path;

/// The three operations offered to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `-I<dir> ` flags followed by the options.
    IncludesAndOptions,
    Options,
    /// Bare include directories.
    Includes,
}

impl Operation {
    /// Run the operation, keeping the error.
    pub fn query(self, session: &Session, file: &Path) -> Result<String> {
        Ok(match self {
            Operation::IncludesAndOptions => {
                let (includes, options) = session.includes_and_options(file)?;
                format!("{}{}", includes.to_flag_string(), options)
            }
            Operation::Options => session.options(file)?.to_string(),
            Operation::Includes => session.includes(file)?.to_string(),
        })
    }

    /// Run the operation, answering with an empty string on any failure.
    pub fn answer(self, session: &Session, file: &Path) -> String {
        collapse(self.query(session, file), file)
    }
}

/// Turn a query result into the host-facing string.
pub fn collapse(result: Result<String>, file: &Path) -> String {
    match result {
        Ok(answer) => answer,
        Err(err) if err.is_no_match() => {
            tracing::debug!("{}", err);
            String::new()
        }
        Err(err) => {
            tracing::error!("query for {} failed: {}", file.display(), err);
            String::new()
        }
    }
}

pub fn get_includes_and_options(session: &Session, file: &Path) -> String {
    Operation::IncludesAndOptions.answer(session, file)
}

pub fn get_options(session: &Session, file: &Path) -> String {
    Operation::Options.answer(session, file)
}

pub fn get_includes(session: &Session, file: &Path) -> String {
    Operation::Includes.answer(session, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompilationDatabase, QueryConfig, QueryError};

    fn session() -> Session {
        let json = r#"[{
            "file": "/proj/a.cpp",
            "directory": "/proj",
            "arguments": ["/usr/bin/c++", "-I/proj/inc", "-std=c++17", "-o", "a.o", "a.cpp"]
        }]"#;
        let db = CompilationDatabase::from_json(json, Path::new("/proj/compile_commands.json")).unwrap();
        Session::new(db, QueryConfig::default())
    }

    #[test]
    fn test_single_record_scenario() {
        let session = session();
        let file = Path::new("/proj/a.cpp");
        assert_eq!(get_includes(&session, file), "/proj/inc ");
        assert_eq!(get_options(&session, file), "-std=c++17 ");
        assert_eq!(get_includes_and_options(&session, file), "-I/proj/inc -std=c++17 ");
    }

    #[test]
    fn test_absent_file_is_empty() {
        let session = session();
        let file = Path::new("/proj/b.cpp");
        assert_eq!(get_includes(&session, file), "");
        assert_eq!(get_options(&session, file), "");
        assert_eq!(get_includes_and_options(&session, file), "");
        assert!(Operation::Options.query(&session, file).unwrap_err().is_no_match());
    }

    #[test]
    fn test_collapse_error() {
        let err = QueryError::NotFound {
            start: "/nowhere".into(),
        };
        assert_eq!(collapse(Err(err), Path::new("/nowhere/a.cpp")), "");
        assert_eq!(collapse(Ok("-O2 ".to_string()), Path::new("a.cpp")), "-O2 ");
    }
}
