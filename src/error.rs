//! Error types for Lua table parsing and serialization.
//!
//! Every failure the crate can produce is a variant of [`Error`]:
//!
//! - **Lexical errors**: unterminated strings, long-bracket strings and tables,
//!   malformed numerals, numeric escapes above 255
//! - **Grammar errors**: unexpected characters, invalid table indices, invalid
//!   identifiers used as keys, empty expressions, excessive nesting
//! - **Access errors**: out-of-range sequence positions, missing mapping keys
//! - **Serialization errors**: values that have no table-literal form
//! - **I/O errors**: file reading/writing failures
//!
//! Parse errors report the 1-based line and column of the failure together with the
//! smallest piece of text that explains it.
//!
//! ## Examples
//!
//! ```rust
//! use serde_luatable::{parse, Error};
//!
//! let err = parse("{1, 2").unwrap_err();
//! assert!(matches!(err, Error::Unterminated { .. }));
//! ```

use std::fmt;
use thiserror::Error;

/// The construct left open when input ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    String,
    LongString,
    Table,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::String => f.write_str("string"),
            Construct::LongString => f.write_str("long-bracket string"),
            Construct::Table => f.write_str("table"),
        }
    }
}

/// Represents all possible errors raised while loading, accessing or dumping Lua tables.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Unexpected character or token
    #[error("Syntax error at line {line}, column {col}: {msg} near '{near}'")]
    Syntax {
        line: usize,
        col: usize,
        msg: String,
        near: String,
    },

    /// Input ended before a string, long-bracket string or table was closed
    #[error("Unterminated {construct} starting at line {line}, column {col}")]
    Unterminated {
        line: usize,
        col: usize,
        construct: Construct,
    },

    #[error("Malformed number at line {line}, column {col} near '{near}'")]
    MalformedNumber {
        line: usize,
        col: usize,
        near: String,
    },

    /// A bracketed index that is neither a string nor a numeral
    #[error("Invalid table index at line {line}, column {col}: {index}")]
    InvalidIndex {
        line: usize,
        col: usize,
        index: String,
    },

    /// A `Name = expr` key that is not a valid identifier
    #[error("Invalid variable name at line {line}, column {col}: {name}")]
    InvalidIdentifier {
        line: usize,
        col: usize,
        name: String,
    },

    #[error("An expression cannot be empty (line {line}, column {col})")]
    EmptyExpression { line: usize, col: usize },

    /// Decimal escape sequence outside the byte range
    #[error("Invalid escape sequence '\\{code}': only codes 0-255 are allowed")]
    InvalidEscapeCode { code: String },

    #[error("Scanner misuse: back() requires a preceding next_clean()")]
    MisusedBack,

    #[error("Tables nested deeper than {max_depth} levels at line {line}, column {col}")]
    TooDeeplyNested {
        line: usize,
        col: usize,
        max_depth: usize,
    },

    #[error("\"{0}\" cannot be converted to a number")]
    NotANumber(String),

    #[error("Table index {index} out of range (length {len})")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Value or key with no table-literal representation
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error naming the offending fragment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_luatable::Error;
    ///
    /// let err = Error::syntax(3, 7, "unexpected character", "@");
    /// assert!(err.to_string().contains("line 3"));
    /// assert!(err.to_string().contains("'@'"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str, near: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
            near: near.to_string(),
        }
    }

    pub fn unterminated(line: usize, col: usize, construct: Construct) -> Self {
        Error::Unterminated {
            line,
            col,
            construct,
        }
    }

    pub fn malformed_number(line: usize, col: usize, near: &str) -> Self {
        Error::MalformedNumber {
            line,
            col,
            near: near.to_string(),
        }
    }

    pub fn invalid_index(line: usize, col: usize, index: &str) -> Self {
        Error::InvalidIndex {
            line,
            col,
            index: index.to_string(),
        }
    }

    pub fn invalid_identifier(line: usize, col: usize, name: &str) -> Self {
        Error::InvalidIdentifier {
            line,
            col,
            name: name.to_string(),
        }
    }

    pub fn serialization<T: fmt::Display>(msg: T) -> Self {
        Error::Serialization(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_luatable::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unterminated_names_construct() {
        let err = Error::unterminated(1, 2, Construct::LongString);
        assert_eq!(
            err.to_string(),
            "Unterminated long-bracket string starting at line 1, column 2"
        );
    }

    #[test]
    fn test_escape_code_message() {
        let err = Error::InvalidEscapeCode {
            code: "256".to_string(),
        };
        assert!(err.to_string().contains("\\256"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(ref msg) if msg.contains("missing")));
    }
}
