//! Lexical path normalization.
//!
//! Paths recorded in a compilation database are never touched on disk:
//! the build tree may be gone or live on another machine. Everything here
//! works purely on path components.

use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into the preceding component.
///
/// A `..` directly below the root stays at the root; a leading `..` in a
/// relative path is kept.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against `base` and clean it.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        clean(path)
    } else {
        clean(&base.join(path))
    }
}

/// Comparison key for a cleaned absolute path.
///
/// Case-insensitive on hosts whose default filesystems are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey(String);

impl PathKey {
    pub fn new(path: &Path) -> Self {
        let s = path.to_string_lossy();
        if cfg!(any(windows, target_os = "macos")) {
            PathKey(s.to_lowercase())
        } else {
            PathKey(s.into_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `path` lies under `root`. Both are compared lexically after
/// [`clean`], so they should be absolute or relative to the same base.
pub fn is_within(path: &Path, root: &Path) -> bool {
    let root = clean(root);
    PathKey::new(&clean(path))
        .as_str()
        .strip_prefix(PathKey::new(&root).as_str())
        .map_or(false, |rest| {
            rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') || root.parent().is_none()
        })
}
