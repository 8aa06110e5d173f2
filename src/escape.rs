//! Backslash escapes shared by the evaluator and the serializer.
//!
//! Both directions are driven by the same tables, so every character the serializer
//! escapes is restored by [`unescape`]:
//!
//! | Written | Character |
//! |---------|-----------|
//! | `\a` `\b` `\f` `\n` `\r` `\t` `\v` | control characters |
//! | `\\` `\'` `\"` `\[` `\]` | the character itself |
//! | `\ddd` (1-3 decimal digits, at most 255) | the character with that code |
//!
//! Any other `\x` is kept as the two characters `\x`.

use crate::{Error, Result};

/// Escape letter and the control character it stands for.
pub const NAMED_ESCAPES: [(char, char); 7] = [
    ('a', '\u{07}'),
    ('b', '\u{08}'),
    ('f', '\u{0C}'),
    ('n', '\n'),
    ('r', '\r'),
    ('t', '\t'),
    ('v', '\u{0B}'),
];

/// Characters written as a backslash followed by themselves.
pub const SELF_ESCAPES: [char; 5] = ['\\', '\'', '"', '[', ']'];

fn control_for_letter(letter: char) -> Option<char> {
    NAMED_ESCAPES
        .iter()
        .find(|(l, _)| *l == letter)
        .map(|(_, c)| *c)
}

fn letter_for_control(control: char) -> Option<char> {
    NAMED_ESCAPES
        .iter()
        .find(|(_, c)| *c == control)
        .map(|(l, _)| *l)
}

/// Resolves backslash escapes in the body of a quoted string.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::escape::unescape;
///
/// assert_eq!(unescape(r"\65\tB").unwrap(), "A\tB");
/// assert_eq!(unescape(r"\q").unwrap(), r"\q");
/// assert!(unescape(r"\256").is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidEscapeCode`] for a decimal escape above 255.
pub fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => out.push('\\'),
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::from(d);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(n) if n.is_ascii_digit() => {
                            digits.push(*n);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let code: u32 = digits.parse().unwrap_or(u32::MAX);
                let byte = u8::try_from(code)
                    .map_err(|_| Error::InvalidEscapeCode { code: digits.clone() })?;
                out.push(char::from(byte));
            }
            Some(e) => {
                if let Some(control) = control_for_letter(e) {
                    out.push(control);
                } else if SELF_ESCAPES.contains(&e) {
                    out.push(e);
                } else {
                    out.push('\\');
                    out.push(e);
                }
            }
        }
    }

    Ok(out)
}

/// Appends `s` to `out` as a double-quoted string literal.
pub fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if let Some(letter) = letter_for_control(c) {
            out.push('\\');
            out.push(letter);
        } else if SELF_ESCAPES.contains(&c) {
            out.push('\\');
            out.push(c);
        } else if c.is_ascii_control() {
            // Zero-padded so a following digit is not read as part of the code.
            out.push_str(&format!("\\{:03}", c as u32));
        } else {
            out.push(c);
        }
    }
    out.push('"');
}

/// Returns `s` as a double-quoted string literal.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::escape::quote;
///
/// assert_eq!(quote("a\n[b]"), r#""a\n\[b\]""#);
/// ```
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    write_quoted(&mut out, s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_escapes() {
        assert_eq!(
            unescape(r"\a\b\f\n\r\t\v").unwrap(),
            "\u{07}\u{08}\u{0C}\n\r\t\u{0B}"
        );
    }

    #[test]
    fn test_self_escapes() {
        assert_eq!(unescape(r#"\\\'\"\[\]"#).unwrap(), "\\'\"[]");
    }

    #[test]
    fn test_decimal_escapes() {
        assert_eq!(unescape(r"\65").unwrap(), "A");
        assert_eq!(unescape(r"\0651").unwrap(), "A1");
        assert_eq!(unescape(r"\9x").unwrap(), "\tx");
        assert_eq!(unescape(r"\255").unwrap(), "\u{FF}");
    }

    #[test]
    fn test_decimal_escape_out_of_range() {
        let err = unescape(r"\256").unwrap_err();
        assert!(matches!(err, Error::InvalidEscapeCode { ref code } if code == "256"));
    }

    #[test]
    fn test_unknown_escape_passes_through() {
        assert_eq!(unescape(r"\x41\z").unwrap(), r"\x41\z");
    }

    #[test]
    fn test_trailing_backslash() {
        assert_eq!(unescape("abc\\").unwrap(), "abc\\");
    }

    #[test]
    fn test_quote_escapes_table_in_reverse() {
        assert_eq!(quote("tab\there"), r#""tab\there""#);
        assert_eq!(quote("'q' \"d\""), r#""\'q\' \"d\"""#);
        assert_eq!(quote("\\"), r#""\\""#);
        assert_eq!(quote("\u{01}2"), r#""\0012""#);
        assert_eq!(quote("héllo"), "\"héllo\"");
    }

    #[test]
    fn test_quote_then_unescape_restores() {
        let original = "a\u{07}b\u{0B}[c]\\'d\"\u{00}\u{7F}1";
        let quoted = quote(original);
        let body = &quoted[1..quoted.len() - 1];
        assert_eq!(unescape(body).unwrap(), original);
    }
}
