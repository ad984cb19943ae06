//! Include-directory and option extraction from resolved records.

use crate::classify::{classify, INCLUDE_FLAG};
use crate::compile_commands::TranslationUnitRecord;
use crate::config::{MatchPolicy, QueryConfig};
use crate::path::absolutize;
use crate::resolve::ResolvedMatch;
use indexmap::IndexSet;
use std::fmt;
use std::path::Path;

/// Deduplicated include directories in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSet(IndexSet<String>);

impl IncludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory given relative to `directory`; returns false if an
    /// equal normalized path was already present.
    pub fn insert(&mut self, dir: &str, directory: &Path) -> bool {
        let normalized = absolutize(Path::new(dir), directory);
        self.0.insert(normalized.to_string_lossy().into_owned())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `-I<dir> ` for every directory.
    pub fn to_flag_string(&self) -> String {
        self.iter().map(|dir| format!("{}{} ", INCLUDE_FLAG, dir)).collect()
    }
}

/// Bare directories, each followed by a space.
impl fmt::Display for IncludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dir in self.iter() {
            write!(f, "{} ", dir)?;
        }
        Ok(())
    }
}

/// Generic options of one record in command-line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionString(Vec<String>);

impl OptionString {
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tokens each followed by a space.
///
/// Tokens are written verbatim without shell quoting, so a token that
/// itself contains whitespace does not survive re-splitting the output on
/// spaces. Use [`OptionString::tokens`] when exact tokens matter.
impl fmt::Display for OptionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "{} ", token)?;
        }
        Ok(())
    }
}

fn selected<'a, 'db>(
    resolved: &'a ResolvedMatch<'db>,
    policy: MatchPolicy,
) -> &'a [&'db TranslationUnitRecord] {
    let records = resolved.records();
    match policy {
        MatchPolicy::First => &records[..records.len().min(1)],
        MatchPolicy::Union => records,
    }
}

/// Include directories of the selected record(s).
pub fn extract_includes(resolved: &ResolvedMatch<'_>, config: &QueryConfig) -> IncludeSet {
    let mut includes = IncludeSet::new();
    for record in selected(resolved, config.resolve.policy) {
        let classified = classify(record, &config.classify);
        for dir in classified.includes() {
            includes.insert(dir, &record.directory);
        }
    }
    includes
}

/// Generic options of the first matching record.
pub fn extract_options(resolved: &ResolvedMatch<'_>, config: &QueryConfig) -> OptionString {
    let Some(record) = resolved.primary() else {
        return OptionString::default();
    };
    let classified = classify(record, &config.classify);
    OptionString(classified.generic().map(str::to_string).collect())
}

/// Both include directories and options.
pub fn extract_all(resolved: &ResolvedMatch<'_>, config: &QueryConfig) -> (IncludeSet, OptionString) {
    (
        extract_includes(resolved, config),
        extract_options(resolved, config),
    )
}
