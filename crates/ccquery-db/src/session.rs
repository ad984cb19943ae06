//! Query sessions over one loaded database.

use crate::aggregate::{extract_all, extract_includes, extract_options, IncludeSet, OptionString};
use crate::compile_commands::CompilationDatabase;
use crate::config::QueryConfig;
use crate::resolve::{resolve, resolve_with_fallback, ResolvedMatch};
use crate::{QueryError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// An immutable database plus the configuration used to query it.
///
/// All query methods take `&self`; a session can be shared between
/// threads without locking.
#[derive(Debug)]
pub struct Session {
    db: CompilationDatabase,
    config: QueryConfig,
    base_dir: PathBuf,
}

impl Session {
    /// Wrap an already loaded database. Relative queries are resolved
    /// against the process working directory.
    pub fn new(db: CompilationDatabase, config: QueryConfig) -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self {
            db,
            config,
            base_dir,
        }
    }

    /// Discover and load the database for `hint`.
    pub fn load(hint: &Path, config: QueryConfig) -> Result<Self> {
        let db = CompilationDatabase::load(hint, &config.database)?;
        Ok(Self::new(db, config))
    }

    /// Use `dir` instead of the working directory for relative queries.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn database(&self) -> &CompilationDatabase {
        &self.db
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Directory relative queries are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `path`, applying the header fallback when enabled. An empty
    /// match is not an error here.
    pub fn resolve(&self, path: &Path) -> ResolvedMatch<'_> {
        if self.config.resolve.header_fallback {
            resolve_with_fallback(&self.db, path, &self.base_dir)
        } else {
            resolve(&self.db, path, &self.base_dir)
        }
    }

    /// Resolve `path`, reporting an empty match as [`QueryError::NoMatch`].
    pub fn lookup(&self, path: &Path) -> Result<ResolvedMatch<'_>> {
        let resolved = self.resolve(path);
        if resolved.is_empty() {
            return Err(QueryError::NoMatch(resolved.path));
        }
        Ok(resolved)
    }

    pub fn includes(&self, path: &Path) -> Result<IncludeSet> {
        Ok(extract_includes(&self.lookup(path)?, &self.config))
    }

    pub fn options(&self, path: &Path) -> Result<OptionString> {
        Ok(extract_options(&self.lookup(path)?, &self.config))
    }

    pub fn includes_and_options(&self, path: &Path) -> Result<(IncludeSet, OptionString)> {
        Ok(extract_all(&self.lookup(path)?, &self.config))
    }
}

/// A reloadable handle to the current session snapshot.
///
/// Readers take an `Arc` to the snapshot and drop the lock at once; a
/// reload parses the new database outside the lock and swaps it in, so
/// running queries finish against the snapshot they started with.
#[derive(Debug)]
pub struct SharedSession {
    current: RwLock<Arc<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            current: RwLock::new(Arc::new(session)),
        }
    }

    /// The active snapshot.
    pub fn snapshot(&self) -> Arc<Session> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the active snapshot.
    pub fn replace(&self, session: Session) {
        let session = Arc::new(session);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Re-read the database file of the active snapshot.
    ///
    /// On failure the previous snapshot stays active.
    pub fn reload(&self) -> Result<()> {
        let old = self.snapshot();
        let db = CompilationDatabase::from_file(old.db.origin())?;
        let session = Session {
            db,
            config: old.config.clone(),
            base_dir: old.base_dir.clone(),
        };
        tracing::debug!("reloaded {}", old.db.origin().display());
        self.replace(session);
        Ok(())
    }
}
