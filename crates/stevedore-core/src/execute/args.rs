//! Shell-like splitting of driver argument strings.

use crate::error::{Error, Result};

/// Split a command line into arguments.
///
/// Whitespace separates arguments; single and double quotes group text, with
/// backslash escaping the next character outside single quotes. Quotes are
/// stripped from the result. An unterminated quote or trailing backslash is
/// an [`Error::InvalidArguments`].
pub fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => {
                        return Err(Error::InvalidArguments(
                            "trailing backslash".to_string(),
                        ));
                    }
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => {
                            return Err(Error::InvalidArguments(
                                "unterminated single quote".to_string(),
                            ));
                        }
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => {
                                return Err(Error::InvalidArguments(
                                    "unterminated double quote".to_string(),
                                ));
                            }
                        },
                        Some(c) => current.push(c),
                        None => {
                            return Err(Error::InvalidArguments(
                                "unterminated double quote".to_string(),
                            ));
                        }
                    }
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        args.push(current);
    }
    Ok(args)
}
