//! compile_commands.json loading and discovery.
//!
//! CMake, Bear, Ninja and friends can record a compile_commands.json file
//! holding the exact compilation command for each source file. Entries
//! carry either a single `command` string or a pre-split `arguments` array.

use crate::config::DatabaseConfig;
use crate::path::{absolutize, PathKey};
use crate::tokenize::split_command;
use crate::{QueryError, Result};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A single entry of compile_commands.json, as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileCommand {
    /// The working directory for compilation.
    pub directory: PathBuf,

    /// The source file path, possibly relative to `directory`.
    pub file: PathBuf,

    /// The full compilation command (shell-quoted).
    #[serde(default)]
    pub command: Option<String>,

    /// The compilation arguments (array form).
    #[serde(default)]
    pub arguments: Option<Vec<String>>,

    /// Output file (optional).
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// One translation unit with normalized paths and split arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnitRecord {
    /// Position of the entry in the database.
    pub index: usize,
    /// Absolute, cleaned source file path.
    pub file: PathBuf,
    /// Absolute, cleaned working directory.
    pub directory: PathBuf,
    /// Never empty; `arguments[0]` is the compiler.
    pub arguments: Vec<String>,
    pub output: Option<PathBuf>,
}

impl TranslationUnitRecord {
    fn from_command(index: usize, cmd: CompileCommand, origin_dir: &Path) -> Result<Self> {
        let arguments = match (cmd.arguments, cmd.command) {
            (Some(args), _) => args,
            (None, Some(command)) => {
                split_command(&command).map_err(|e| QueryError::MalformedRecord {
                    index,
                    reason: e.to_string(),
                })?
            }
            (None, None) => {
                return Err(QueryError::MalformedRecord {
                    index,
                    reason: "neither `command` nor `arguments` given".to_string(),
                })
            }
        };

        if arguments.is_empty() {
            return Err(QueryError::MalformedRecord {
                index,
                reason: "empty command line".to_string(),
            });
        }

        let directory = absolutize(&cmd.directory, origin_dir);
        let file = absolutize(&cmd.file, &directory);

        Ok(Self {
            index,
            file,
            directory,
            arguments,
            output: cmd.output,
        })
    }

    /// The compiler invocation.
    pub fn compiler(&self) -> &str {
        &self.arguments[0]
    }

    /// Everything after the compiler.
    pub fn flags(&self) -> &[String] {
        &self.arguments[1..]
    }
}

/// A loaded compilation database.
///
/// Immutable after construction, so it can be shared freely between
/// threads.
#[derive(Debug)]
pub struct CompilationDatabase {
    origin: PathBuf,
    records: Vec<TranslationUnitRecord>,
    rejected: Vec<QueryError>,
    by_file: FxHashMap<PathKey, Vec<usize>>,
    directories: IndexSet<PathBuf>,
}

impl CompilationDatabase {
    /// Locate a database from `hint` and load it.
    pub fn load(hint: &Path, config: &DatabaseConfig) -> Result<Self> {
        let path = locate(hint, config)?;
        Self::from_file(&path)
    }

    /// Load a database from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| QueryError::io(path, e))?;
        Self::from_json(&content, path)
    }

    /// Parse a database from a JSON string.
    ///
    /// `origin` is the path the JSON was read from; a relative `directory`
    /// field is resolved against its parent.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self> {
        let malformed = |reason: String| QueryError::MalformedDatabase {
            path: origin.to_path_buf(),
            reason,
        };

        let commands: Vec<CompileCommand> =
            serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;

        if let Some(index) = commands
            .iter()
            .position(|c| c.command.is_none() && c.arguments.is_none())
        {
            return Err(malformed(format!(
                "entry #{} has neither `command` nor `arguments`",
                index
            )));
        }

        let origin_dir = origin
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let mut records = Vec::with_capacity(commands.len());
        let mut rejected = Vec::new();
        for (index, cmd) in commands.into_iter().enumerate() {
            match TranslationUnitRecord::from_command(index, cmd, &origin_dir) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!("{}: skipping entry: {}", origin.display(), err);
                    rejected.push(err);
                }
            }
        }

        let mut by_file: FxHashMap<PathKey, Vec<usize>> = FxHashMap::default();
        let mut directories = IndexSet::new();
        for (pos, record) in records.iter().enumerate() {
            by_file.entry(PathKey::new(&record.file)).or_default().push(pos);
            directories.insert(record.directory.clone());
        }

        tracing::debug!(
            "loaded {} translation units from {} ({} rejected)",
            records.len(),
            origin.display(),
            rejected.len()
        );

        Ok(Self {
            origin: origin.to_path_buf(),
            records,
            rejected,
            by_file,
            directories,
        })
    }

    /// Where the database was read from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// All usable records, in database order.
    pub fn records(&self) -> &[TranslationUnitRecord] {
        &self.records
    }

    /// Entries that could not be turned into records.
    pub fn rejected(&self) -> &[QueryError] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose source file has the given comparison key, in database
    /// order.
    pub(crate) fn records_for<'a>(
        &'a self,
        key: &PathKey,
    ) -> impl Iterator<Item = &'a TranslationUnitRecord> + 'a {
        self.by_file
            .get(key)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.records[pos])
    }

    /// Distinct working directories, in order of first appearance.
    pub(crate) fn directories(&self) -> impl Iterator<Item = &Path> + '_ {
        self.directories.iter().map(PathBuf::as_path)
    }
}

/// Find the compilation database for `hint`.
///
/// A hint naming an existing `.json` file is returned as is. Otherwise the
/// directory of the hint and each of its ancestors is searched for the
/// configured file name, directly and inside `build/` or `build.*/`
/// subdirectories.
pub fn locate(hint: &Path, config: &DatabaseConfig) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| QueryError::io(".", e))?;
    let hint = absolutize(hint, &cwd);

    if hint.is_file() && hint.extension().map_or(false, |ext| ext == "json") {
        return Ok(hint);
    }

    let start = if hint.is_dir() {
        hint.as_path()
    } else {
        hint.parent().unwrap_or(&hint)
    };

    for dir in start.ancestors() {
        if let Some(found) = search_dir(dir, config) {
            tracing::debug!("found compilation database at {}", found.display());
            return Ok(found);
        }
    }

    Err(QueryError::NotFound { start: hint })
}

fn search_dir(dir: &Path, config: &DatabaseConfig) -> Option<PathBuf> {
    let direct = dir.join(&config.filename);
    if direct.is_file() {
        return Some(direct);
    }

    if !config.search_build_dirs {
        return None;
    }

    let build = dir.join("build").join(&config.filename);
    if build.is_file() {
        return Some(build);
    }

    // build.<platform> directories, newest database first
    let entries = std::fs::read_dir(dir).ok()?;
    let mut candidates: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("build."))
        .map(|entry| entry.path().join(&config.filename))
        .filter_map(|path| {
            let mtime = std::fs::metadata(&path).ok()?.modified().ok()?;
            Some((mtime, path))
        })
        .collect();

    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    candidates.into_iter().next().map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "/home/user/project/build/compile_commands.json";

    #[test]
    fn test_parse_compile_commands() {
        let json = r#"[
            {
                "directory": "/home/user/project/build",
                "file": "../src/main.cc",
                "command": "g++ -I/usr/include -I../include -DDEBUG=1 -std=c++23 -c ../src/main.cc"
            },
            {
                "directory": "/home/user/project/build",
                "file": "/home/user/project/src/utils.cc",
                "arguments": ["g++", "-I/usr/include", "-DNDEBUG", "-c", "utils.cc"],
                "output": "utils.o"
            }
        ]"#;

        let db = CompilationDatabase::from_json(json, Path::new(ORIGIN)).unwrap();

        assert_eq!(db.len(), 2);
        assert!(db.rejected().is_empty());

        let first = &db.records()[0];
        assert_eq!(first.file, PathBuf::from("/home/user/project/src/main.cc"));
        assert_eq!(first.compiler(), "g++");
        assert_eq!(first.flags().len(), 6);

        let second = &db.records()[1];
        assert_eq!(second.index, 1);
        assert_eq!(second.output, Some(PathBuf::from("utils.o")));
    }

    #[test]
    fn test_relative_directory_uses_origin() {
        let json = r#"[{"directory": "sub", "file": "a.c", "arguments": ["cc", "a.c"]}]"#;
        let db = CompilationDatabase::from_json(json, Path::new("/db/compile_commands.json")).unwrap();
        assert_eq!(db.records()[0].directory, PathBuf::from("/db/sub"));
        assert_eq!(db.records()[0].file, PathBuf::from("/db/sub/a.c"));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let json = r#"[{"directory": "/build", "command": "cc -c a.c"}]"#;
        let err = CompilationDatabase::from_json(json, Path::new(ORIGIN)).unwrap_err();
        assert!(matches!(err, QueryError::MalformedDatabase { .. }));
        assert!(err.to_string().contains("file"));
    }

    #[test]
    fn test_missing_command_is_malformed() {
        let json = r#"[{"directory": "/build", "file": "a.c"}]"#;
        let err = CompilationDatabase::from_json(json, Path::new(ORIGIN)).unwrap_err();
        assert!(matches!(err, QueryError::MalformedDatabase { .. }));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = CompilationDatabase::from_json("{not json", Path::new(ORIGIN)).unwrap_err();
        assert!(matches!(err, QueryError::MalformedDatabase { .. }));
    }

    #[test]
    fn test_bad_quoting_rejects_single_record() {
        let json = r#"[
            {"directory": "/build", "file": "a.c", "command": "cc -DX='oops a.c"},
            {"directory": "/build", "file": "b.c", "command": "cc -c b.c"},
            {"directory": "/build", "file": "c.c", "arguments": []}
        ]"#;

        let db = CompilationDatabase::from_json(json, Path::new(ORIGIN)).unwrap();

        assert_eq!(db.len(), 1);
        assert_eq!(db.records()[0].file, PathBuf::from("/build/b.c"));
        assert_eq!(db.records()[0].index, 1);
        assert_eq!(db.rejected().len(), 2);
        assert!(matches!(
            db.rejected()[0],
            QueryError::MalformedRecord { index: 0, .. }
        ));
    }

    #[test]
    fn test_directories_in_order() {
        let json = r#"[
            {"directory": "/b", "file": "x.c", "arguments": ["cc"]},
            {"directory": "/a", "file": "y.c", "arguments": ["cc"]},
            {"directory": "/b", "file": "z.c", "arguments": ["cc"]}
        ]"#;
        let db = CompilationDatabase::from_json(json, Path::new(ORIGIN)).unwrap();
        let dirs: Vec<&Path> = db.directories().collect();
        assert_eq!(dirs, vec![Path::new("/b"), Path::new("/a")]);
    }
}
