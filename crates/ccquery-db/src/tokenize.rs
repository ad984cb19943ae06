//! Shell-style word splitting for the `command` form of database entries.

use thiserror::Error;

/// A command string that cannot be split into words.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("unterminated {quote} quote starting at byte {offset}")]
    UnterminatedQuote { quote: char, offset: usize },

    #[error("trailing backslash at end of command")]
    TrailingEscape,
}

/// Split a command line into words the way a POSIX shell would.
///
/// Only quoting and escaping are interpreted; no expansion takes place.
pub fn split_command(cmd: &str) -> Result<Vec<String>, TokenizeError> {
    let mut words = Vec::new();
    let mut word = String::new();
    // A quoted empty string ("") still produces a word.
    let mut in_word = false;
    let mut chars = cmd.char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            ' ' | '\t' | '\n' => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            '\\' => match chars.next() {
                // Escaped newline is a line continuation.
                Some((_, '\n')) => {}
                Some((_, escaped)) => {
                    word.push(escaped);
                    in_word = true;
                }
                None => return Err(TokenizeError::TrailingEscape),
            },
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, inner)) => word.push(inner),
                        None => {
                            return Err(TokenizeError::UnterminatedQuote { quote: '\'', offset })
                        }
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\\')) => match chars.next() {
                            Some((_, e @ ('"' | '\\' | '$' | '`'))) => word.push(e),
                            Some((_, '\n')) => {}
                            Some((_, other)) => {
                                word.push('\\');
                                word.push(other);
                            }
                            None => {
                                return Err(TokenizeError::UnterminatedQuote { quote: '"', offset })
                            }
                        },
                        Some((_, inner)) => word.push(inner),
                        None => {
                            return Err(TokenizeError::UnterminatedQuote { quote: '"', offset })
                        }
                    }
                }
            }
            other => {
                word.push(other);
                in_word = true;
            }
        }
    }

    if in_word {
        words.push(word);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(cmd: &str) -> Vec<String> {
        split_command(cmd).unwrap()
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(split("  c++  -c\ta.cpp \n"), vec!["c++", "-c", "a.cpp"]);
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
    }

    #[test]
    fn test_only_ascii_blanks_separate() {
        assert_eq!(split("cc -DA=x\u{a0}y a.c"), vec!["cc", "-DA=x\u{a0}y", "a.c"]);
        assert_eq!(split("cc\u{2003}a.c"), vec!["cc\u{2003}a.c"]);
    }

    #[test]
    fn test_quoting() {
        assert_eq!(
            split(r#"c++ "-DNAME=\"x y\"" -I'/my dir' a.cpp"#),
            vec!["c++", r#"-DNAME="x y""#, "-I/my dir", "a.cpp"]
        );
        assert_eq!(split(r#"cc 'a\b' "a\b""#), vec!["cc", r"a\b", r"a\b"]);
        assert_eq!(split(r#"cc "" ''"#), vec!["cc", "", ""]);
        assert_eq!(split(r#"cc -DX="1"2'3'"#), vec!["cc", "-DX=123"]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(split(r"cc -I/my\ dir a.cpp"), vec!["cc", "-I/my dir", "a.cpp"]);
        assert_eq!(split("cc -c \\\n a.cpp"), vec!["cc", "-c", "a.cpp"]);
        assert_eq!(split(r#"cc -DQ=\"v\""#), vec!["cc", r#"-DQ="v""#]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            split_command("cc 'unterminated"),
            Err(TokenizeError::UnterminatedQuote { quote: '\'', offset: 3 })
        );
        assert_eq!(
            split_command(r#"cc -D"x"#),
            Err(TokenizeError::UnterminatedQuote { quote: '"', offset: 5 })
        );
        assert_eq!(split_command("cc \\"), Err(TokenizeError::TrailingEscape));
    }
}
