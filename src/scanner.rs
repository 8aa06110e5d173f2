//! Lexical scanning of Lua table text.
//!
//! The [`Scanner`] owns a cursor over the input and hands out cleaned tokens: whitespace,
//! `--` line comments and `--[==[ ... ]==]` long comments are skipped by
//! [`Scanner::next_clean`]. Token readers for quoted strings, long-bracket strings,
//! numerals and identifiers return slices of the input; escape resolution and numeric
//! conversion happen one layer up.
//!
//! ## Backtracking
//!
//! Two rollback mechanisms exist:
//!
//! - [`Scanner::back`] undoes the most recent [`Scanner::next_clean`] (single slot)
//! - [`Scanner::mark`] / [`Scanner::restore`] and the [`Scanner::attempt`] combinator give
//!   arbitrary-depth commit-or-rollback, used to tell a long-bracket string (`[==[`) apart
//!   from a bracketed index (`[1]`)
//!
//! ```rust
//! use serde_luatable::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("  -- note\n [[raw]] ");
//! assert_eq!(scanner.next_clean(), Some('['));
//! scanner.back().unwrap();
//! assert_eq!(scanner.read_long_string().unwrap(), Some("raw"));
//! ```

use crate::error::Construct;
use crate::{Error, Result};

/// A saved cursor state for [`Scanner::restore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    position: usize,
    last_clean: Option<usize>,
}

/// A cursor over table text that tracks the start of the last significant token.
pub struct Scanner<'a> {
    input: &'a str,
    position: usize,
    last_clean: Option<usize>, // start of the token returned by the last next_clean()
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input,
            position: 0,
            last_clean: None,
        }
    }

    #[inline]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Current byte offset into the input.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// 1-based line and column of a byte offset.
    pub fn location(&self, offset: usize) -> (usize, usize) {
        let before = &self.input[..offset.min(self.input.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = before[line_start..].chars().count() + 1;
        (line, col)
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Returns the next raw character, or `None` past the end of input.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    /// Steps back over the previous character.
    pub fn back_one(&mut self) {
        if let Some(ch) = self.input[..self.position].chars().next_back() {
            self.position -= ch.len_utf8();
        }
    }

    /// Steps over the next character without returning it.
    pub fn forward_one(&mut self) {
        self.next();
    }

    #[inline]
    pub fn mark(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            last_clean: self.last_clean,
        }
    }

    #[inline]
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.last_clean = checkpoint.last_clean;
    }

    /// Runs `f`, rolling the cursor back to where it started if `f` returns `None`.
    pub fn attempt<T, F>(&mut self, f: F) -> Option<T>
    where
        F: FnOnce(&mut Self) -> Option<T>,
    {
        let checkpoint = self.mark();
        let result = f(self);
        if result.is_none() {
            self.restore(checkpoint);
        }
        result
    }

    /// Skips whitespace and comments, then returns the next raw character.
    ///
    /// The start of the returned character is remembered for [`Scanner::back`].
    pub fn next_clean(&mut self) -> Option<char> {
        self.skip_spaces();
        while self.skip_comment() {
            self.skip_spaces();
        }
        self.last_clean = Some(self.position);
        self.next()
    }

    /// Rolls back the character returned by the last [`Scanner::next_clean`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MisusedBack`] when there is nothing to roll back: before the
    /// first `next_clean()`, or on a second `back()` in a row.
    pub fn back(&mut self) -> Result<()> {
        match self.last_clean.take() {
            Some(position) => {
                self.position = position;
                Ok(())
            }
            None => Err(Error::MisusedBack),
        }
    }

    /// Start offset of the token returned by the last [`Scanner::next_clean`].
    #[inline]
    pub fn token_start(&self) -> usize {
        self.last_clean.unwrap_or(self.position)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.next();
        }
    }

    /// Swallows one comment at the cursor. Returns `false` (cursor untouched) if there is
    /// none.
    fn skip_comment(&mut self) -> bool {
        if !self.input[self.position..].starts_with("--") {
            return false;
        }
        self.position += 2;

        match self.attempt(Scanner::open_long_bracket) {
            // An unterminated long comment runs to the end of input.
            Some(level) => {
                if self.close_long_bracket(level).is_none() {
                    self.position = self.input.len();
                }
            }
            None => self.skip_line(),
        }
        true
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.next() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Consumes `[` `=`* `[` and returns the level (number of `=`).
    fn open_long_bracket(&mut self) -> Option<usize> {
        if self.next() != Some('[') {
            return None;
        }
        let mut level = 0;
        while self.peek() == Some('=') {
            self.next();
            level += 1;
        }
        match self.next() {
            Some('[') => Some(level),
            _ => None,
        }
    }

    /// Consumes up to and including the `]` `=`{level} `]` closer. Returns the offset
    /// where the closer starts, or `None` if input ends first.
    fn close_long_bracket(&mut self, level: usize) -> Option<usize> {
        loop {
            let start = self.position;
            if self.next()? != ']' {
                continue;
            }
            let closed = self
                .attempt(|s| {
                    let mut count = 0;
                    while s.peek() == Some('=') {
                        s.next();
                        count += 1;
                    }
                    (count == level && s.next() == Some(']')).then_some(())
                })
                .is_some();
            if closed {
                return Some(start);
            }
        }
    }

    /// Reads a long-bracket string at the cursor with commit-or-rollback semantics.
    ///
    /// Returns `Ok(None)` with the cursor unchanged when the text at the cursor does not
    /// open a long bracket, so the caller can reinterpret the `[`. The content between
    /// the brackets is returned verbatim.
    ///
    /// # Errors
    ///
    /// Once an opener has matched, running out of input before the matching closer is
    /// an [`Error::Unterminated`] long-bracket string.
    pub fn read_long_string(&mut self) -> Result<Option<&'a str>> {
        let start = self.position;
        let Some(level) = self.attempt(Scanner::open_long_bracket) else {
            return Ok(None);
        };
        let body_start = self.position;
        match self.close_long_bracket(level) {
            Some(body_end) => Ok(Some(&self.input[body_start..body_end])),
            None => {
                let (line, col) = self.location(start);
                Err(Error::unterminated(line, col, Construct::LongString))
            }
        }
    }

    /// Reads a `'` or `"` delimited string at the cursor and returns its raw body.
    ///
    /// Backslash escapes are kept as written; a backslash always protects the following
    /// character, so `\"` does not close the string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unterminated`] if input ends before the closing quote, and
    /// [`Error::Syntax`] if the cursor is not on a quote.
    pub fn read_quoted(&mut self) -> Result<&'a str> {
        let start = self.position;
        let quote = match self.next() {
            Some(q @ ('"' | '\'')) => q,
            other => {
                let (line, col) = self.location(start);
                let near = other.map(String::from).unwrap_or_default();
                return Err(Error::syntax(line, col, "expected a quote", &near));
            }
        };
        let body_start = self.position;

        loop {
            match self.next() {
                Some(c) if c == quote => {
                    return Ok(&self.input[body_start..self.position - quote.len_utf8()]);
                }
                Some('\\') => {
                    if self.next().is_none() {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            }
        }

        let (line, col) = self.location(start);
        Err(Error::unterminated(line, col, Construct::String))
    }

    /// Reads a decimal numeral: optional sign, digits, optional fraction, optional
    /// exponent with optional sign.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedNumber`] when neither the integer nor the fractional part
    /// has a digit (`.`, `-`), or when an exponent has no digits (`1e`, `1e-`).
    pub fn read_number(&mut self) -> Result<&'a str> {
        let start = self.position;

        if matches!(self.peek(), Some('+' | '-')) {
            self.next();
        }
        let int_digits = self.skip_digits();
        let mut frac_digits = 0;
        if self.peek() == Some('.') {
            self.next();
            frac_digits = self.skip_digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(self.malformed_number(start));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.next();
            if matches!(self.peek(), Some('+' | '-')) {
                self.next();
            }
            if self.skip_digits() == 0 {
                return Err(self.malformed_number(start));
            }
        }

        Ok(&self.input[start..self.position])
    }

    fn skip_digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.next();
            count += 1;
        }
        count
    }

    fn malformed_number(&self, start: usize) -> Error {
        let (line, col) = self.location(start);
        Error::malformed_number(line, col, &self.input[start..self.position])
    }

    /// Reads a name: a letter or underscore followed by letters, digits or underscores.
    /// Returns an empty slice if the cursor is not on a name start.
    pub fn read_identifier(&mut self) -> &'a str {
        let start = self.position;
        if matches!(self.peek(), Some(c) if is_name_start(c)) {
            self.next();
            while matches!(self.peek(), Some(c) if is_name_continue(c)) {
                self.next();
            }
        }
        &self.input[start..self.position]
    }
}

#[inline]
pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns `true` if `name` is a valid Lua identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_name_start(c) => chars.all(is_name_continue),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_clean_skips_comments() {
        let mut scanner = Scanner::new("  --[[ block ]] -- line\n --[==[ a ]] b ]==] x");
        assert_eq!(scanner.next_clean(), Some('x'));
        assert_eq!(scanner.next_clean(), None);
    }

    #[test]
    fn test_dash_dash_bracket_without_opener_is_line_comment() {
        let mut scanner = Scanner::new("--[= not long\n7");
        assert_eq!(scanner.next_clean(), Some('7'));
    }

    #[test]
    fn test_single_dash_is_not_comment() {
        let mut scanner = Scanner::new(" -1");
        assert_eq!(scanner.next_clean(), Some('-'));
        assert_eq!(scanner.next(), Some('1'));
    }

    #[test]
    fn test_unterminated_long_comment_runs_to_end() {
        let mut scanner = Scanner::new("--[[ never closed");
        assert_eq!(scanner.next_clean(), None);
    }

    #[test]
    fn test_back_rolls_to_token_start() {
        let mut scanner = Scanner::new("  -- c\n  ,");
        assert_eq!(scanner.next_clean(), Some(','));
        scanner.back().unwrap();
        assert_eq!(scanner.peek(), Some(','));
    }

    #[test]
    fn test_back_misuse() {
        let mut scanner = Scanner::new("abc");
        assert!(matches!(scanner.back(), Err(Error::MisusedBack)));

        scanner.next_clean();
        assert!(scanner.back().is_ok());
        assert!(matches!(scanner.back(), Err(Error::MisusedBack)));
    }

    #[test]
    fn test_back_one_forward_one() {
        let mut scanner = Scanner::new("aé");
        scanner.forward_one();
        scanner.forward_one();
        assert_eq!(scanner.next(), None);
        scanner.back_one();
        assert_eq!(scanner.peek(), Some('é'));
    }

    #[test]
    fn test_attempt_restores_on_failure() {
        let mut scanner = Scanner::new("[1]");
        assert_eq!(scanner.attempt(Scanner::open_long_bracket), None);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_mark_restore() {
        let mut scanner = Scanner::new("abc");
        let checkpoint = scanner.mark();
        scanner.next();
        scanner.next();
        scanner.restore(checkpoint);
        assert_eq!(scanner.next(), Some('a'));
    }

    #[test]
    fn test_long_string_levels() {
        let mut scanner = Scanner::new("[==[a]=]b]]c]==]");
        assert_eq!(scanner.read_long_string().unwrap(), Some("a]=]b]]c"));
        assert_eq!(scanner.peek(), None);
    }

    #[test]
    fn test_long_string_close_after_bracket() {
        let mut scanner = Scanner::new("[[x]]]");
        assert_eq!(scanner.read_long_string().unwrap(), Some("x"));
        assert_eq!(scanner.peek(), Some(']'));
    }

    #[test]
    fn test_long_string_not_matched() {
        let mut scanner = Scanner::new("[=x");
        assert_eq!(scanner.read_long_string().unwrap(), None);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_long_string_unterminated() {
        let mut scanner = Scanner::new("[=[abc]]");
        let err = scanner.read_long_string().unwrap_err();
        assert!(matches!(
            err,
            Error::Unterminated {
                construct: Construct::LongString,
                ..
            }
        ));
    }

    #[test]
    fn test_read_quoted_keeps_escapes() {
        let mut scanner = Scanner::new(r#""a\"b\65" rest"#);
        assert_eq!(scanner.read_quoted().unwrap(), r#"a\"b\65"#);
        assert_eq!(scanner.next_clean(), Some('r'));
    }

    #[test]
    fn test_read_quoted_other_quote_inside() {
        let mut scanner = Scanner::new("'say \"hi\"'");
        assert_eq!(scanner.read_quoted().unwrap(), "say \"hi\"");
    }

    #[test]
    fn test_read_quoted_unterminated() {
        let mut scanner = Scanner::new("\"abc\\\"");
        let err = scanner.read_quoted().unwrap_err();
        assert!(matches!(
            err,
            Error::Unterminated {
                construct: Construct::String,
                line: 1,
                col: 1
            }
        ));
    }

    #[test]
    fn test_read_number_forms() {
        for (text, expected) in [
            ("42,", "42"),
            ("-3.5}", "-3.5"),
            ("+.5 ", "+.5"),
            ("7.", "7."),
            ("1e10", "1e10"),
            ("2.5E-3;", "2.5E-3"),
        ] {
            let mut scanner = Scanner::new(text);
            assert_eq!(scanner.read_number().unwrap(), expected);
        }
    }

    #[test]
    fn test_read_number_malformed() {
        for text in [".", "-", "-.", "1e", "1e-", "3E+x"] {
            let mut scanner = Scanner::new(text);
            assert!(
                matches!(scanner.read_number(), Err(Error::MalformedNumber { .. })),
                "{text:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_read_identifier() {
        let mut scanner = Scanner::new("_abc9 = 1");
        assert_eq!(scanner.read_identifier(), "_abc9");
        assert_eq!(scanner.next_clean(), Some('='));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("x"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn test_location() {
        let scanner = Scanner::new("ab\ncd\ne");
        assert_eq!(scanner.location(0), (1, 1));
        assert_eq!(scanner.location(4), (2, 2));
        assert_eq!(scanner.location(6), (3, 1));
    }
}
