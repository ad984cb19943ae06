//! Query configuration (ccquery.toml format).
//!
//! Every field has a default, so an empty file is valid.
//!
//! ```toml
//! [database]
//! filename = "compile_commands.json"
//! search_build_dirs = true
//!
//! [resolve]
//! policy = "union"
//! header_fallback = false
//!
//! [classify]
//! drop_flags = ["-c", "-MD", "-MMD"]
//! drop_flags_with_value = ["-o", "-MF", "-MT", "-MQ"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root query configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Database discovery.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Translation-unit resolution.
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Argument classification.
    #[serde(default)]
    pub classify: ClassifyConfig,

    /// Editor flag generation.
    #[serde(default)]
    pub editor: EditorConfig,
}

/// Where to look for the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// File name searched for in each ancestor directory.
    pub filename: String,

    /// Also look in `build/` and `build.*/` subdirectories.
    pub search_build_dirs: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            filename: "compile_commands.json".to_string(),
            search_build_dirs: true,
        }
    }
}

/// Which records contribute when a file appears more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Includes and options both come from the first matching record.
    #[default]
    First,
    /// Includes are merged over all matching records; options still come
    /// from the first one.
    Union,
}

/// Translation-unit resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    pub policy: MatchPolicy,

    /// Answer queries for an unlisted header with the flags of a sibling
    /// source file.
    pub header_fallback: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            policy: MatchPolicy::First,
            header_fallback: true,
        }
    }
}

/// Which arguments count as build bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Standalone flags to drop.
    pub drop_flags: Vec<String>,

    /// Flags to drop together with their value (split or attached).
    pub drop_flags_with_value: Vec<String>,

    /// Drop the argument naming the translation unit's own source file.
    pub drop_source_file: bool,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            drop_flags: ["-c", "-MD", "-MMD"].map(String::from).to_vec(),
            drop_flags_with_value: ["-o", "-MF", "-MT", "-MQ"].map(String::from).to_vec(),
            drop_source_file: true,
        }
    }
}

/// Editor flag generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Flags used when the file is not covered by any database.
    pub default_flags: Vec<String>,

    /// Extend the default flags from `$HOME/.local/include`,
    /// `$ROOTSYS/include` and `$CPPFLAGS`.
    pub use_environment: bool,

    /// Render include directories outside the project root as `-isystem`.
    pub system_outside_root: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_flags: ["-Wall", "-Werror", "-std=c++17", "-x", "c++"]
                .map(String::from)
                .to_vec(),
            use_environment: true,
            system_outside_root: true,
        }
    }
}

impl QueryConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| crate::QueryError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
