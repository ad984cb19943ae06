//! Flag lists for editor completion engines.
//!
//! Unlike the boundary operations, the result is a list of separate
//! arguments ready to hand to a clang-based completer: paths are absolute,
//! and a file outside every database still gets a usable default set.

use crate::aggregate::{extract_includes, IncludeSet};
use crate::classify::{classify, INCLUDE_FLAG};
use crate::config::EditorConfig;
use crate::path::{absolutize, is_within};
use crate::session::Session;
use std::path::{Path, PathBuf};

/// Flags whose value is a path, longest spelling first where one is a
/// prefix of another.
pub const PATH_FLAGS: &[&str] = &["-isystem", "-iquote", "-I", "--sysroot="];

/// Flags for `file`: from the database when it lists the file, otherwise
/// the configured defaults.
pub fn flags_for_file(
    session: Option<&Session>,
    file: &Path,
    project_root: Option<&Path>,
    fallback: &EditorConfig,
) -> Vec<String> {
    session
        .and_then(|session| flags_from_session(session, file, project_root))
        .unwrap_or_else(|| {
            tracing::debug!("no database entry for {}, using defaults", file.display());
            default_flags(fallback)
        })
}

/// Options of the matching record with absolute paths, followed by its
/// include directories. `None` if the file is not listed.
///
/// A relative `project_root` is taken relative to the session base
/// directory.
pub fn flags_from_session(session: &Session, file: &Path, project_root: Option<&Path>) -> Option<Vec<String>> {
    let resolved = session.resolve(file);
    let record = resolved.primary()?;
    let config = session.config();

    let classified = classify(record, &config.classify);
    let options: Vec<&str> = classified.generic().collect();
    let mut flags = make_paths_absolute(&options, &record.directory);

    let includes = extract_includes(&resolved, config);
    let root = project_root
        .filter(|_| config.editor.system_outside_root)
        .map(|root| absolutize(root, session.base_dir()));
    flags.extend(include_flags_relative_to(&includes, root.as_deref()));
    Some(flags)
}

/// Rewrite relative values of [`PATH_FLAGS`], attached or split, against
/// `working_dir`.
pub fn make_paths_absolute(flags: &[&str], working_dir: &Path) -> Vec<String> {
    let mut out = Vec::with_capacity(flags.len());
    let mut next_is_path = false;

    for &flag in flags {
        if next_is_path {
            next_is_path = false;
            out.push(absolute_string(flag, working_dir));
            continue;
        }

        let mut rewritten = None;
        for &path_flag in PATH_FLAGS {
            if flag == path_flag {
                next_is_path = true;
                break;
            }
            if let Some(value) = flag.strip_prefix(path_flag) {
                rewritten = Some(format!("{}{}", path_flag, absolute_string(value, working_dir)));
                break;
            }
        }
        out.push(rewritten.unwrap_or_else(|| flag.to_string()));
    }

    out
}

fn absolute_string(path: &str, working_dir: &Path) -> String {
    absolutize(Path::new(path), working_dir)
        .to_string_lossy()
        .into_owned()
}

/// `-I<dir>` per directory, or `-isystem <dir>` for directories outside
/// `root` when one is given.
pub fn include_flags_relative_to(includes: &IncludeSet, root: Option<&Path>) -> Vec<String> {
    let mut flags = Vec::with_capacity(includes.len());
    for dir in includes.iter() {
        match root {
            Some(root) if !is_within(Path::new(dir), root) => {
                flags.push("-isystem".to_string());
                flags.push(dir.to_string());
            }
            _ => flags.push(format!("{}{}", INCLUDE_FLAG, dir)),
        }
    }
    flags
}

/// The configured default flags, extended from the environment if enabled.
pub fn default_flags(config: &EditorConfig) -> Vec<String> {
    let mut flags = config.default_flags.clone();
    if config.use_environment {
        flags.extend(environment_flags(
            |name| std::env::var(name).ok(),
            |dir| dir.is_dir(),
        ));
    }
    flags
}

/// Include flags from `$HOME/.local/include`, `$ROOTSYS/include` and the
/// `-I` entries of `$CPPFLAGS`.
pub fn environment_flags(
    var: impl Fn(&str) -> Option<String>,
    dir_exists: impl Fn(&Path) -> bool,
) -> Vec<String> {
    let mut flags = Vec::new();

    for (name, sub) in [("HOME", ".local/include"), ("ROOTSYS", "include")] {
        if let Some(base) = var(name) {
            let dir: PathBuf = Path::new(&base).join(sub);
            if dir_exists(&dir) {
                flags.push(format!("{}{}", INCLUDE_FLAG, dir.display()));
            }
        }
    }

    if let Some(cppflags) = var("CPPFLAGS") {
        flags.extend(
            cppflags
                .split_whitespace()
                .filter(|flag| flag.starts_with(INCLUDE_FLAG))
                .map(str::to_string),
        );
    }

    flags
}
