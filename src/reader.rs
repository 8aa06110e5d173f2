//! Recursive-descent reader for the table-literal grammar.
//!
//! ```text
//! table     ::= '{' fieldlist? '}'
//! fieldlist ::= field (fieldsep field)* fieldsep?
//! field     ::= '[' index ']' '=' expr | Name '=' expr | expr
//! index     ::= string | number
//! expr      ::= 'nil' | 'true' | 'false' | number | string | table
//! fieldsep  ::= ',' | ';'
//! ```
//!
//! The [`Reader`] checks syntax and produces a [`Field`] list per table. Keys are already
//! typed ([`Key`]); values are left as [`Expr`] syntax and turned into
//! [`LuaValue`](crate::LuaValue)s by the evaluator. A field that starts with `[` is first
//! tried as a long-bracket string, and only reinterpreted as `[index] = expr` when no
//! long bracket opens there.

use crate::error::Construct;
use crate::scanner::{is_identifier, is_name_start, Scanner};
use crate::{escape, Error, Key, Number, ParseOptions, Result};
use std::ops::Range;

/// A value expression as written.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr<'a> {
    /// A bare name: `nil`, `true`, `false` or any other identifier.
    Word(&'a str),
    Number(Number),
    /// String contents with escapes resolved.
    String(String),
    Table(Vec<Field<'a>>),
}

/// One comma/semicolon separated element of a table constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<'a> {
    /// `None` for a keyless (positional) field.
    pub key: Option<Key>,
    pub value: Expr<'a>,
}

/// Reads tables, fields and expressions from a [`Scanner`] with a nesting limit.
pub struct Reader<'a> {
    scanner: Scanner<'a>,
    max_depth: usize,
    open_tables: Vec<usize>, // offsets of the '{' of each table being read
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, &ParseOptions::default())
    }

    pub fn with_options(input: &'a str, options: &ParseOptions) -> Self {
        Reader {
            scanner: Scanner::new(input),
            max_depth: options.max_depth,
            open_tables: Vec::new(),
        }
    }

    /// Reads one table constructor and returns its fields in source order.
    ///
    /// Text after the closing brace is left unread.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Unterminated`] (table) if input ends before `}`, with
    /// [`Error::Syntax`] if a field is followed by something other than `,`, `;` or `}`,
    /// with [`Error::TooDeeplyNested`] past the nesting limit, and with any error raised
    /// while reading a field.
    pub fn next_table(&mut self) -> Result<Vec<Field<'a>>> {
        match self.scanner.next_clean() {
            Some('{') => {}
            other => {
                let near = other.map(String::from).unwrap_or_else(|| "<eof>".to_string());
                return Err(self.syntax_at(
                    self.scanner.token_start(),
                    "a table must start with '{'",
                    &near,
                ));
            }
        }

        let start = self.scanner.token_start();
        if self.open_tables.len() >= self.max_depth {
            let (line, col) = self.scanner.location(start);
            return Err(Error::TooDeeplyNested {
                line,
                col,
                max_depth: self.max_depth,
            });
        }
        self.open_tables.push(start);
        tracing::trace!(depth = self.open_tables.len(), offset = start, "reading table");

        let mut fields = Vec::new();
        loop {
            match self.scanner.next_clean() {
                None => return Err(self.unterminated_table()),
                Some('}') => break,
                Some(_) => {
                    self.scanner.back()?;
                    fields.push(self.next_field()?);
                }
            }

            match self.scanner.next_clean() {
                Some(',' | ';') => {
                    if self.scanner.next_clean() == Some('}') {
                        break;
                    }
                    self.scanner.back()?;
                }
                Some('}') => break,
                None => return Err(self.unterminated_table()),
                Some(c) => {
                    return Err(self.syntax_at(
                        self.scanner.token_start(),
                        "expected ',', ';' or '}'",
                        &c.to_string(),
                    ))
                }
            }
        }

        self.open_tables.pop();
        Ok(fields)
    }

    /// Reads one field. The cursor is left before the separator or `}` that follows it.
    pub fn next_field(&mut self) -> Result<Field<'a>> {
        let first = self.scanner.next_clean();
        let field_start = self.scanner.token_start();

        let (field, value_span) = if first == Some('[') {
            self.scanner.back()?;
            if let Some(body) = self.scanner.read_long_string()? {
                let field = Field {
                    key: None,
                    value: Expr::String(body.to_string()),
                };
                (field, field_start..self.scanner.position())
            } else {
                self.scanner.forward_one();
                self.next_indexed_field()?
            }
        } else {
            self.scanner.back()?;
            let (expr, span) = self.next_expr()?;
            match self.scanner.next_clean() {
                Some('=') => {
                    let name = &self.scanner.input()[span.clone()];
                    let key = match expr {
                        Expr::Word(word) if is_identifier(word) => Key::String(word.to_string()),
                        _ => {
                            let (line, col) = self.scanner.location(span.start);
                            return Err(Error::invalid_identifier(line, col, name));
                        }
                    };
                    let (value, value_span) = self.next_expr()?;
                    let field = Field {
                        key: Some(key),
                        value,
                    };
                    (field, value_span)
                }
                Some(_) => {
                    self.scanner.back()?;
                    (Field { key: None, value: expr }, span)
                }
                None => return Err(self.unterminated_table()),
            }
        };

        match self.scanner.next_clean() {
            Some(',' | ';' | '}') => {
                self.scanner.back()?;
                Ok(field)
            }
            None => Err(self.unterminated_table()),
            Some(_) => {
                let near = &self.scanner.input()[value_span];
                Err(self.syntax_at(self.scanner.token_start(), "unexpected token after", near))
            }
        }
    }

    /// Reads the rest of `[index] = expr` after the opening `[`.
    fn next_indexed_field(&mut self) -> Result<(Field<'a>, Range<usize>)> {
        let (index, span) = self.next_expr()?;
        let index_text = &self.scanner.input()[span.clone()];

        match self.scanner.next_clean() {
            Some(']') => {}
            None => return Err(self.unterminated_table()),
            Some(c) => {
                return Err(self.syntax_at(
                    self.scanner.token_start(),
                    "expected ']' to close table index",
                    &c.to_string(),
                ))
            }
        }

        let key = match index {
            Expr::String(s) => Key::String(s),
            Expr::Number(n) => Key::from(n),
            _ => {
                let (line, col) = self.scanner.location(span.start);
                return Err(Error::invalid_index(line, col, index_text));
            }
        };

        match self.scanner.next_clean() {
            Some('=') => {}
            None => return Err(self.unterminated_table()),
            Some(c) => {
                return Err(self.syntax_at(
                    self.scanner.token_start(),
                    "expected '=' after table index",
                    &c.to_string(),
                ))
            }
        }

        let (value, value_span) = self.next_expr()?;
        Ok((
            Field {
                key: Some(key),
                value,
            },
            value_span,
        ))
    }

    /// Reads one expression and returns it with its byte span.
    pub fn next_expr(&mut self) -> Result<(Expr<'a>, Range<usize>)> {
        let c = self.scanner.next_clean();
        let start = self.scanner.token_start();

        let expr = match c {
            None => {
                let (line, col) = self.scanner.location(start);
                return Err(Error::EmptyExpression { line, col });
            }
            Some('{') => {
                self.scanner.back()?;
                Expr::Table(self.next_table()?)
            }
            Some('"' | '\'') => {
                self.scanner.back()?;
                let raw = self.scanner.read_quoted()?;
                Expr::String(escape::unescape(raw)?)
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => {
                self.scanner.back()?;
                let numeral = self.scanner.read_number()?;
                Expr::Number(Number::from_numeral(numeral)?)
            }
            Some(c) if is_name_start(c) => {
                self.scanner.back()?;
                Expr::Word(self.scanner.read_identifier())
            }
            Some('[') => {
                self.scanner.back()?;
                match self.scanner.read_long_string()? {
                    Some(body) => Expr::String(body.to_string()),
                    None => return Err(self.syntax_at(start, "unexpected symbol", "[")),
                }
            }
            Some(c) => return Err(self.syntax_at(start, "unexpected symbol", &c.to_string())),
        };

        Ok((expr, start..self.scanner.position()))
    }

    fn syntax_at(&self, offset: usize, msg: &str, near: &str) -> Error {
        let (line, col) = self.scanner.location(offset);
        Error::syntax(line, col, msg, near)
    }

    fn unterminated_table(&self) -> Error {
        let start = self.open_tables.last().copied().unwrap_or(0);
        let (line, col) = self.scanner.location(start);
        Error::unterminated(line, col, Construct::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(text: &str) -> Vec<Field<'_>> {
        Reader::new(text).next_table().unwrap()
    }

    fn keyless(value: Expr<'_>) -> Field<'_> {
        Field { key: None, value }
    }

    #[test]
    fn test_empty_table() {
        assert!(fields("{}").is_empty());
        assert!(fields("  { -- nothing\n }").is_empty());
    }

    #[test]
    fn test_field_forms() {
        let got = fields(r#"{1, x = true, ["k"] = 'v', [2.5] = nil; word}"#);
        assert_eq!(
            got,
            vec![
                keyless(Expr::Number(Number::Integer(1))),
                Field {
                    key: Some(Key::from("x")),
                    value: Expr::Word("true"),
                },
                Field {
                    key: Some(Key::from("k")),
                    value: Expr::String("v".to_string()),
                },
                Field {
                    key: Some(Key::Float(2.5)),
                    value: Expr::Word("nil"),
                },
                keyless(Expr::Word("word")),
            ]
        );
    }

    #[test]
    fn test_trailing_separator() {
        assert_eq!(fields("{1,}").len(), 1);
        assert_eq!(fields("{1;2;}").len(), 2);
    }

    #[test]
    fn test_long_string_field_is_positional() {
        let got = fields("{[==[a]=]b]==], [ [[k]] ] = 1}");
        assert_eq!(got[0], keyless(Expr::String("a]=]b".to_string())));
        assert_eq!(got[1].key, Some(Key::from("k")));
    }

    #[test]
    fn test_nested_tables() {
        let got = fields("{{1}, t = {}}");
        assert_eq!(
            got[0],
            keyless(Expr::Table(vec![keyless(Expr::Number(Number::Integer(1)))]))
        );
        assert_eq!(got[1].value, Expr::Table(vec![]));
    }

    #[test]
    fn test_escapes_resolved_in_strings() {
        let got = fields(r#"{"\65\n"}"#);
        assert_eq!(got[0].value, Expr::String("A\n".to_string()));
    }

    #[test]
    fn test_missing_close_brace() {
        let err = Reader::new("{1, 2").next_table().unwrap_err();
        assert!(matches!(
            err,
            Error::Unterminated {
                construct: Construct::Table,
                line: 1,
                col: 1
            }
        ));
    }

    #[test]
    fn test_missing_separator() {
        let err = Reader::new("{1 2}").next_table().unwrap_err();
        assert!(matches!(err, Error::Syntax { ref near, .. } if near == "1"));
    }

    #[test]
    fn test_identifier_key_rules() {
        let err = Reader::new("{1x=2}").next_table().unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));

        let err = Reader::new(r#"{"a" = 2}"#).next_table().unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { ref name, .. } if name == "\"a\""));

        let err = Reader::new("{3 = 2}").next_table().unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_invalid_index() {
        for text in ["{[{}] = 1}", "{[nil] = 1}", "{[abc] = 1}"] {
            let err = Reader::new(text).next_table().unwrap_err();
            assert!(matches!(err, Error::InvalidIndex { .. }), "{text}");
        }
    }

    #[test]
    fn test_indexed_field_errors() {
        let err = Reader::new("{[1 = 2}").next_table().unwrap_err();
        assert!(matches!(err, Error::Syntax { ref near, .. } if near == "="));

        let err = Reader::new("{[1] 2}").next_table().unwrap_err();
        assert!(matches!(err, Error::Syntax { ref near, .. } if near == "2"));
    }

    #[test]
    fn test_expression_errors() {
        assert!(matches!(
            Reader::new("{x = ").next_table().unwrap_err(),
            Error::EmptyExpression { .. }
        ));
        assert!(matches!(
            Reader::new("{@}").next_table().unwrap_err(),
            Error::Syntax { ref near, .. } if near == "@"
        ));
        assert!(matches!(
            Reader::new("{x = [=1}").next_table().unwrap_err(),
            Error::Syntax { ref near, .. } if near == "["
        ));
        assert!(matches!(
            Reader::new("{.}").next_table().unwrap_err(),
            Error::MalformedNumber { .. }
        ));
        assert!(matches!(
            Reader::new(r#"{"\300"}"#).next_table().unwrap_err(),
            Error::InvalidEscapeCode { .. }
        ));
    }

    #[test]
    fn test_not_a_table() {
        let err = Reader::new("  x").next_table().unwrap_err();
        assert!(matches!(err, Error::Syntax { ref near, line: 1, col: 3, .. } if near == "x"));
        assert!(matches!(
            Reader::new("").next_table().unwrap_err(),
            Error::Syntax { .. }
        ));
    }

    #[test]
    fn test_depth_limit() {
        let options = ParseOptions::new().with_max_depth(3);
        assert!(Reader::with_options("{{{}}}", &options).next_table().is_ok());
        let err = Reader::with_options("{{{{}}}}", &options)
            .next_table()
            .unwrap_err();
        assert!(matches!(err, Error::TooDeeplyNested { max_depth: 3, col: 4, .. }));
    }

    #[test]
    fn test_error_location_spans_lines() {
        let err = Reader::new("{\n  1,\n  @\n}").next_table().unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 3, col: 3, .. }));
    }
}
