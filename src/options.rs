//! Configuration options for parsing and dumping.
//!
//! - [`DumpOptions`]: indentation factor used when mapping-shaped tables are dumped
//! - [`ParseOptions`]: nesting limit applied while reading table text
//!
//! ## Examples
//!
//! ```rust
//! use serde_luatable::{parse, to_string_with_options, DumpOptions};
//!
//! let value = parse("{x = 1, y = 2}").unwrap();
//!
//! let pretty = to_string_with_options(&value, DumpOptions::new()).unwrap();
//! assert_eq!(pretty, "{\n    [\"x\"]= 1,\n    [\"y\"]= 2\n}");
//!
//! let compact = to_string_with_options(&value, DumpOptions::compact()).unwrap();
//! assert_eq!(compact, "{[\"x\"]=1,[\"y\"]=2}");
//! ```

/// Default indentation factor for mapping-shaped tables.
pub const DEFAULT_INDENT: usize = 4;

/// Default maximum table nesting depth accepted by the reader.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Controls the layout of dumped table text.
///
/// Sequences are always written on one line. Mappings with more than one entry put each
/// entry on its own line, indented by `indent` columns per nesting level, unless `indent`
/// is zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpOptions {
    pub indent: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            indent: DEFAULT_INDENT,
        }
    }
}

impl DumpOptions {
    /// Creates default options (4-column indentation).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_luatable::DumpOptions;
    ///
    /// assert_eq!(DumpOptions::new().indent, 4);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that dump everything on a single line.
    #[must_use]
    pub fn compact() -> Self {
        DumpOptions { indent: 0 }
    }

    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Controls how table text is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Tables nested deeper than this fail with `TooDeeplyNested`.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_luatable::{parse_with_options, ParseOptions};
    ///
    /// let options = ParseOptions::new().with_max_depth(2);
    /// assert!(parse_with_options("{{1}}", &options).is_ok());
    /// assert!(parse_with_options("{{{1}}}", &options).is_err());
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
