//! Command-line argument classification.
//!
//! Every argument after the compiler falls into exactly one of three
//! buckets: an include search directory, a bookkeeping token that only
//! mattered to the original build, or a generic option kept verbatim.

use crate::compile_commands::TranslationUnitRecord;
use crate::config::ClassifyConfig;
use crate::path::{absolutize, PathKey};
use std::path::Path;

/// The include-search-path flag.
pub const INCLUDE_FLAG: &str = "-I";

/// How an include directory was written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeSpelling {
    /// `-I<dir>`
    Attached,
    /// `-I <dir>`
    Split,
}

/// A classified argument, borrowing from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    Include {
        dir: &'a str,
        spelling: IncludeSpelling,
    },
    /// One or two tokens (a flag and its value) to drop.
    Bookkeeping { tokens: &'a [String] },
    Generic(&'a str),
}

/// Classification of a whole record, in command-line order.
#[derive(Debug, Clone, Default)]
pub struct Classification<'a> {
    pub items: Vec<Classified<'a>>,
}

impl<'a> Classification<'a> {
    /// Include directories as written.
    pub fn includes(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.items.iter().filter_map(|item| match *item {
            Classified::Include { dir, .. } => Some(dir),
            _ => None,
        })
    }

    pub fn bookkeeping(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.items
            .iter()
            .filter_map(|item| match *item {
                Classified::Bookkeeping { tokens } => Some(tokens.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
    }

    /// Generic options in original order.
    pub fn generic(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.items.iter().filter_map(|item| match *item {
            Classified::Generic(token) => Some(token),
            _ => None,
        })
    }
}

/// Classify the arguments of `record`, skipping the compiler.
pub fn classify<'a>(record: &'a TranslationUnitRecord, config: &ClassifyConfig) -> Classification<'a> {
    let args = record.flags();
    let source_key = PathKey::new(&record.file);
    let mut items = Vec::with_capacity(args.len());

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();

        if arg == INCLUDE_FLAG {
            if let Some(dir) = args.get(i + 1) {
                items.push(Classified::Include {
                    dir: dir.as_str(),
                    spelling: IncludeSpelling::Split,
                });
                i += 2;
            } else {
                tracing::warn!("entry #{}: `-I` without a directory", record.index);
                items.push(Classified::Bookkeeping {
                    tokens: &args[i..=i],
                });
                i += 1;
            }
            continue;
        }

        if let Some(dir) = arg.strip_prefix(INCLUDE_FLAG) {
            items.push(Classified::Include {
                dir,
                spelling: IncludeSpelling::Attached,
            });
            i += 1;
            continue;
        }

        if config.drop_flags.iter().any(|f| f == arg) {
            items.push(Classified::Bookkeeping {
                tokens: &args[i..=i],
            });
            i += 1;
            continue;
        }

        if config.drop_flags_with_value.iter().any(|f| f == arg) {
            if i + 1 < args.len() {
                items.push(Classified::Bookkeeping {
                    tokens: &args[i..=i + 1],
                });
                i += 2;
            } else {
                tracing::warn!("entry #{}: `{}` without a value", record.index, arg);
                items.push(Classified::Bookkeeping {
                    tokens: &args[i..=i],
                });
                i += 1;
            }
            continue;
        }

        let attached_value = config
            .drop_flags_with_value
            .iter()
            .any(|f| arg.len() > f.len() && arg.starts_with(f.as_str()));
        if attached_value || (config.drop_source_file && is_source_arg(arg, record, &source_key)) {
            items.push(Classified::Bookkeeping {
                tokens: &args[i..=i],
            });
        } else {
            items.push(Classified::Generic(arg));
        }
        i += 1;
    }

    Classification { items }
}

fn is_source_arg(arg: &str, record: &TranslationUnitRecord, source_key: &PathKey) -> bool {
    !arg.starts_with('-') && PathKey::new(&absolutize(Path::new(arg), &record.directory)) == *source_key
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(args: &[&str]) -> TranslationUnitRecord {
        TranslationUnitRecord {
            index: 0,
            file: PathBuf::from("/proj/src/a.cpp"),
            directory: PathBuf::from("/proj/build"),
            arguments: args.iter().map(|s| s.to_string()).collect(),
            output: None,
        }
    }

    #[test]
    fn test_flag_shapes() {
        let config = ClassifyConfig::default();
        let cases: &[(&[&str], Classified<'static>)] = &[
            (
                &["c++", "-I/inc"],
                Classified::Include {
                    dir: "/inc",
                    spelling: IncludeSpelling::Attached,
                },
            ),
            (
                &["c++", "-I", "../inc"],
                Classified::Include {
                    dir: "../inc",
                    spelling: IncludeSpelling::Split,
                },
            ),
            (&["c++", "-std=c++17"], Classified::Generic("-std=c++17")),
            (&["c++", "-isystem"], Classified::Generic("-isystem")),
            (&["c++", "-DFOO=1"], Classified::Generic("-DFOO=1")),
            (&["c++", "other.cpp"], Classified::Generic("other.cpp")),
        ];

        for (args, expected) in cases {
            let rec = record(args);
            let classified = classify(&rec, &config);
            assert_eq!(classified.items, vec![expected.clone()], "{:?}", args);
        }
    }

    #[test]
    fn test_bookkeeping_shapes() {
        let config = ClassifyConfig::default();
        let cases: &[&[&str]] = &[
            &["c++", "-o", "a.o"],
            &["c++", "-oa.o"],
            &["c++", "-c"],
            &["c++", "-MD"],
            &["c++", "-MMD"],
            &["c++", "-MF", "a.d"],
            &["c++", "-MFa.d"],
            &["c++", "-MT", "a.o"],
            &["c++", "-MQ", "a.o"],
            &["c++", "../src/a.cpp"],
            &["c++", "/proj/src/a.cpp"],
            &["c++", "-o"],
        ];

        for args in cases {
            let rec = record(args);
            let classified = classify(&rec, &config);
            assert_eq!(classified.items.len(), 1, "{:?}", args);
            assert!(
                matches!(classified.items[0], Classified::Bookkeeping { .. }),
                "{:?} -> {:?}",
                args,
                classified.items
            );
            assert_eq!(classified.bookkeeping().count(), args.len() - 1);
        }
    }

    #[test]
    fn test_order_preserved() {
        let rec = record(&[
            "/usr/bin/c++",
            "-DA",
            "-I/inc",
            "-O2",
            "-o",
            "a.o",
            "-I",
            "rel",
            "-c",
            "../src/a.cpp",
            "-Wall",
        ]);
        let classified = classify(&rec, &ClassifyConfig::default());

        assert_eq!(classified.generic().collect::<Vec<_>>(), vec!["-DA", "-O2", "-Wall"]);
        assert_eq!(classified.includes().collect::<Vec<_>>(), vec!["/inc", "rel"]);
        assert_eq!(
            classified.bookkeeping().collect::<Vec<_>>(),
            vec!["-o", "a.o", "-c", "../src/a.cpp"]
        );
    }

    #[test]
    fn test_dangling_include_dropped() {
        let rec = record(&["cc", "-O1", "-I"]);
        let classified = classify(&rec, &ClassifyConfig::default());
        assert_eq!(classified.generic().collect::<Vec<_>>(), vec!["-O1"]);
        assert_eq!(classified.includes().count(), 0);
    }

    #[test]
    fn test_keep_source_and_compile_flag_when_configured() {
        let config = ClassifyConfig {
            drop_flags: Vec::new(),
            drop_source_file: false,
            ..ClassifyConfig::default()
        };
        let rec = record(&["cc", "-c", "../src/a.cpp", "-o", "a.o"]);
        let classified = classify(&rec, &config);
        assert_eq!(classified.generic().collect::<Vec<_>>(), vec!["-c", "../src/a.cpp"]);
    }
}
