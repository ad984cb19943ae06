//! Mapping a queried file path to translation-unit records.

use crate::compile_commands::{CompilationDatabase, TranslationUnitRecord};
use crate::path::{absolutize, clean, PathKey};
use std::path::{Path, PathBuf};

pub const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cxx", "cc", "c", "m", "mm"];
pub const HEADER_EXTENSIONS: &[&str] = &["h", "hxx", "hpp", "hh"];

/// The records matching one queried path, in database order.
#[derive(Debug, Clone)]
pub struct ResolvedMatch<'db> {
    /// The normalized path that was looked up (or matched).
    pub path: PathBuf,
    /// Set when a header query was answered through a sibling source file.
    pub substitute: Option<PathBuf>,
    records: Vec<&'db TranslationUnitRecord>,
}

impl<'db> ResolvedMatch<'db> {
    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            substitute: None,
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The record used when a single one is needed: the first in database
    /// order.
    pub fn primary(&self) -> Option<&'db TranslationUnitRecord> {
        self.records.first().copied()
    }

    pub fn records(&self) -> &[&'db TranslationUnitRecord] {
        &self.records
    }
}

/// Resolve `queried` against `db` by exact normalized-path equality.
///
/// A relative path is tried against `base_dir` first and then against each
/// working directory recorded in the database.
pub fn resolve<'db>(db: &'db CompilationDatabase, queried: &Path, base_dir: &Path) -> ResolvedMatch<'db> {
    if queried.is_absolute() {
        return lookup(db, clean(queried));
    }

    let first = lookup(db, absolutize(queried, base_dir));
    if !first.is_empty() {
        return first;
    }

    for dir in db.directories() {
        let found = lookup(db, absolutize(queried, dir));
        if !found.is_empty() {
            tracing::debug!("{} resolved relative to {}", queried.display(), dir.display());
            return found;
        }
    }

    first
}

/// Like [`resolve`], but an unlisted header is answered with the records
/// of the first sibling source file (same stem) that is listed.
pub fn resolve_with_fallback<'db>(
    db: &'db CompilationDatabase,
    queried: &Path,
    base_dir: &Path,
) -> ResolvedMatch<'db> {
    let found = resolve(db, queried, base_dir);
    if !found.is_empty() || !is_header(queried) {
        return found;
    }

    for ext in SOURCE_EXTENSIONS {
        let sibling = queried.with_extension(ext);
        let mut candidate = resolve(db, &sibling, base_dir);
        if !candidate.is_empty() {
            tracing::debug!(
                "header {} answered by {}",
                queried.display(),
                candidate.path.display()
            );
            candidate.substitute = Some(candidate.path.clone());
            candidate.path = found.path;
            return candidate;
        }
    }

    found
}

/// Whether the last extension of `path` is a header extension.
pub fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| HEADER_EXTENSIONS.contains(&ext))
}

fn lookup(db: &CompilationDatabase, path: PathBuf) -> ResolvedMatch<'_> {
    let key = PathKey::new(&path);
    let records: Vec<_> = db.records_for(&key).collect();
    if records.is_empty() {
        return ResolvedMatch::empty(path);
    }
    ResolvedMatch {
        path,
        substitute: None,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> CompilationDatabase {
        let json = r#"[
            {"directory": "/proj", "file": "a.cpp", "arguments": ["c++", "-DFIRST", "a.cpp"]},
            {"directory": "/proj/build", "file": "../src/b.cc", "arguments": ["c++", "../src/b.cc"]},
            {"directory": "/proj", "file": "/proj/a.cpp", "arguments": ["c++", "-DSECOND", "a.cpp"]},
            {"directory": "/proj/lib", "file": "widget.cpp", "arguments": ["c++", "widget.cpp"]}
        ]"#;
        CompilationDatabase::from_json(json, Path::new("/proj/compile_commands.json")).unwrap()
    }

    #[test]
    fn test_exact_absolute_match() {
        let db = db();
        let found = resolve(&db, Path::new("/proj/a.cpp"), Path::new("/"));
        assert_eq!(found.len(), 2);
        assert_eq!(found.primary().unwrap().index, 0);
        assert_eq!(found.records()[1].index, 2);
    }

    #[test]
    fn test_dot_segments_normalized() {
        let db = db();
        let found = resolve(&db, Path::new("/proj/build/../src/./b.cc"), Path::new("/"));
        assert_eq!(found.primary().unwrap().index, 1);
        assert_eq!(found.path, PathBuf::from("/proj/src/b.cc"));
    }

    #[test]
    fn test_relative_to_base_dir() {
        let db = db();
        let found = resolve(&db, Path::new("src/b.cc"), Path::new("/proj"));
        assert_eq!(found.primary().unwrap().index, 1);
    }

    #[test]
    fn test_relative_to_record_directory() {
        let db = db();
        let found = resolve(&db, Path::new("widget.cpp"), Path::new("/elsewhere"));
        assert_eq!(found.primary().unwrap().index, 3);
    }

    #[test]
    fn test_no_suffix_matching() {
        let db = db();
        assert!(resolve(&db, Path::new("/other/a.cpp"), Path::new("/")).is_empty());
        assert!(resolve(&db, Path::new("/proj/src/b"), Path::new("/")).is_empty());
    }

    #[test]
    fn test_header_fallback() {
        let db = db();
        let found = resolve_with_fallback(&db, Path::new("/proj/src/b.h"), Path::new("/"));
        assert_eq!(found.primary().unwrap().index, 1);
        assert_eq!(found.path, PathBuf::from("/proj/src/b.h"));
        assert_eq!(found.substitute, Some(PathBuf::from("/proj/src/b.cc")));

        assert!(resolve_with_fallback(&db, Path::new("/proj/src/c.h"), Path::new("/")).is_empty());
        assert!(resolve_with_fallback(&db, Path::new("/proj/src/b.txt"), Path::new("/")).is_empty());
    }

    #[test]
    fn test_is_header() {
        assert!(is_header(Path::new("x.hpp")));
        assert!(is_header(Path::new("x.cpp.h")));
        assert!(!is_header(Path::new("x.h.cpp")));
        assert!(!is_header(Path::new("Makefile")));
    }
}
