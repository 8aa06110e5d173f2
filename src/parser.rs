//! A stateful holder for one parsed table.
//!
//! [`LuaTableParser`] keeps a single value tree and exposes loading, dumping and
//! indexed access on top of the free functions in this crate.
//!
//! ```rust
//! use serde_luatable::{LuaTableParser, LuaValue};
//!
//! let mut parser = LuaTableParser::new();
//! parser.load("{1, 2, 3}").unwrap();
//! assert_eq!(parser.get(2).unwrap(), &LuaValue::from(2));
//! assert_eq!(parser.dump().unwrap(), "{1,2,3}");
//! ```

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::de::sequence_to_map;
use crate::ser::{dump, ValueSerializer};
use crate::{
    parse_with_options, DumpOptions, Error, Key, LuaMap, LuaValue, ParseOptions, Result,
};

/// Holds the most recently loaded table.
///
/// The stored tree starts out as the empty table and is only ever replaced as a whole.
/// A failed [`load`](LuaTableParser::load) keeps the previous tree.
#[derive(Clone, Debug)]
pub struct LuaTableParser {
    value: LuaValue,
    parse_options: ParseOptions,
    dump_options: DumpOptions,
}

impl Default for LuaTableParser {
    fn default() -> Self {
        LuaTableParser {
            value: LuaValue::Sequence(Vec::new()),
            parse_options: ParseOptions::default(),
            dump_options: DumpOptions::default(),
        }
    }
}

impl LuaTableParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(parse_options: ParseOptions, dump_options: DumpOptions) -> Self {
        LuaTableParser {
            parse_options,
            dump_options,
            ..Self::default()
        }
    }

    /// The stored tree.
    pub fn value(&self) -> &LuaValue {
        &self.value
    }

    /// Parses `text` and replaces the stored tree with the result.
    ///
    /// # Errors
    ///
    /// Returns the parse error unchanged; the stored tree is not touched.
    pub fn load(&mut self, text: &str) -> Result<()> {
        debug!(len = text.len(), "loading table text");
        let value = parse_with_options(text, &self.parse_options)?;
        debug!(shape = value.type_name(), "table loaded");
        self.value = value;
        Ok(())
    }

    /// Dumps the stored tree as table text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the tree holds a NaN.
    pub fn dump(&self) -> Result<String> {
        let text = dump(&self.value, &self.dump_options)?;
        debug!(len = text.len(), "table dumped");
        Ok(text)
    }

    /// Looks up one entry of the stored tree.
    ///
    /// Sequences are indexed from 1.
    ///
    /// ```rust
    /// use serde_luatable::{Error, LuaTableParser, LuaValue};
    ///
    /// let mut parser = LuaTableParser::new();
    /// parser.load("{x = 0, y = 1, [3] = 2}").unwrap();
    /// assert_eq!(parser.get(3).unwrap(), &LuaValue::from(2));
    /// assert_eq!(parser.get("y").unwrap(), &LuaValue::from(1));
    /// assert!(matches!(parser.get("z"), Err(Error::KeyNotFound(_))));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for an integer outside `1..=len` on a sequence
    /// and [`Error::KeyNotFound`] for any other missing key.
    pub fn get(&self, key: impl Into<Key>) -> Result<&LuaValue> {
        let key = key.into();
        match &self.value {
            LuaValue::Sequence(seq) => match key {
                Key::Integer(index) => usize::try_from(index)
                    .ok()
                    .and_then(|i| i.checked_sub(1))
                    .and_then(|i| seq.get(i))
                    .ok_or(Error::IndexOutOfRange {
                        index,
                        len: seq.len(),
                    }),
                other => Err(Error::KeyNotFound(other.to_string())),
            },
            LuaValue::Table(map) => map
                .get(&key)
                .ok_or_else(|| Error::KeyNotFound(key.to_string())),
            _ => Err(Error::KeyNotFound(key.to_string())),
        }
    }

    /// Reads a whole file and loads its text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or the parse error.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading table file");
        let text = std::fs::read_to_string(path)?;
        self.load(&text)
    }

    /// Dumps the stored tree and writes it to a file, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns the dump error, or [`Error::Io`] if the file cannot be written.
    pub fn dump_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.dump()?;
        debug!(path = %path.display(), len = text.len(), "writing table file");
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Loads a native map, struct or sequence.
    ///
    /// The value goes through table text, so it is stored exactly as if that text had been
    /// loaded. Entries whose keys are neither strings nor numbers are dropped.
    ///
    /// ```rust
    /// use serde_luatable::{LuaTableParser, LuaValue};
    /// use std::collections::BTreeMap;
    ///
    /// let mut native = BTreeMap::new();
    /// native.insert("answer", 42);
    ///
    /// let mut parser = LuaTableParser::new();
    /// parser.load_from_mapping(&native).unwrap();
    /// assert_eq!(parser.get("answer").unwrap(), &LuaValue::from(42));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the value is not table-shaped.
    pub fn load_from_mapping<T>(&mut self, mapping: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = mapping.serialize(ValueSerializer::lenient())?;
        if !value.is_table() && !value.is_sequence() {
            return Err(Error::serialization(format!(
                "expected a map or a sequence, found {}",
                value.type_name()
            )));
        }
        debug!(shape = value.type_name(), "loading native mapping");
        let text = dump(&value, &self.dump_options)?;
        self.load(&text)
    }

    /// Returns the stored tree as a mapping.
    ///
    /// A sequence is keyed `1, 2, ...` with its `nil` holes left out.
    ///
    /// # Errors
    ///
    /// Fails only if the stored tree is not a table.
    pub fn to_mapping(&self) -> Result<LuaMap> {
        match &self.value {
            LuaValue::Table(map) => Ok(map.clone()),
            LuaValue::Sequence(seq) => Ok(sequence_to_map(seq.clone())),
            other => Err(Error::serialization(format!(
                "expected a table, found {}",
                other.type_name()
            ))),
        }
    }
}
