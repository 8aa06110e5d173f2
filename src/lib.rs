//! # serde_luatable
//!
//! A parser and serializer for Lua table constructors, with a Serde bridge.
//!
//! ## What it reads
//!
//! The literal subset of Lua table syntax:
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
//! Strings may be quoted with `'` or `"` (with backslash escapes) or written as long
//! brackets (`[[...]]`, `[==[...]==]`). Line comments (`--`) and long comments
//! (`--[[...]]`) are skipped anywhere whitespace is allowed.
//!
//! A table becomes a [`LuaValue::Sequence`] when none of its fields carries a key and a
//! [`LuaValue::Table`] otherwise. Positional fields of a mixed table get the keys
//! `1, 2, ...` unless an explicit key already took them.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_luatable::{parse, to_string_compact, Key, LuaValue};
//!
//! let value = parse(r#"{x = 10, y = 45; "one", "two", --[[skipped]] "three"}"#).unwrap();
//! let table = value.as_table().unwrap();
//! assert_eq!(table.get(&Key::from("x")), Some(&LuaValue::from(10)));
//! assert_eq!(table.get(&Key::from(3)), Some(&LuaValue::from("three")));
//!
//! assert_eq!(
//!     to_string_compact(&value).unwrap(),
//!     r#"{["x"]=10,["y"]=45,[1]="one",[2]="two",[3]="three"}"#
//! );
//! ```
//!
//! ### With Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_luatable::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Window {
//!     title: String,
//!     size: (u32, u32),
//!     visible: bool,
//! }
//!
//! let window: Window = from_str("{title = 'main', size = {640, 480}, visible = true}").unwrap();
//! assert_eq!(window.size, (640, 480));
//!
//! let text = to_string(&window).unwrap();
//! let back: Window = from_str(&text).unwrap();
//! assert_eq!(window, back);
//! ```
//!
//! ### Holding a table
//!
//! ```rust
//! use serde_luatable::{LuaTableParser, LuaValue};
//!
//! let mut parser = LuaTableParser::new();
//! parser.load("{nil, 0, nil, 1}").unwrap();
//! assert_eq!(parser.get(4).unwrap(), &LuaValue::from(1));
//! ```
//!
//! ## Not supported
//!
//! This is not a Lua interpreter: variables, operators, function calls and metatables are
//! not part of the accepted grammar. A bare word other than `nil`, `true` or `false` in
//! value position reads as `nil`.

pub mod de;
pub mod error;
pub mod escape;
pub mod eval;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod reader;
pub mod scanner;
pub mod ser;
pub mod value;

pub use de::{from_value, ValueDeserializer};
pub use error::{Construct, Error, Result};
pub use eval::{parse, parse_with_options};
pub use map::LuaMap;
pub use options::{DumpOptions, ParseOptions};
pub use parser::LuaTableParser;
pub use ser::{Serializer, ValueSerializer};
pub use value::{Key, LuaValue, Number};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to indented table text.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let text = to_string(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(text, "{\n    [\"x\"]= 1,\n    [\"y\"]= 2\n}");
/// ```
///
/// # Errors
///
/// Returns an error if a map key is not a string or number, or a number is NaN.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, DumpOptions::default())
}

/// Serialize any `T: Serialize` to single-line table text.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::to_string_compact;
///
/// assert_eq!(to_string_compact(&vec![Some(1), None, Some(3)]).unwrap(), "{1,nil,3}");
/// ```
///
/// # Errors
///
/// Returns an error if a map key is not a string or number, or a number is NaN.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_compact<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, DumpOptions::compact())
}

/// Serialize any `T: Serialize` to table text with custom options.
///
/// # Errors
///
/// Returns an error if a map key is not a string or number, or a number is NaN.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: DumpOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let value = to_value(value)?;
    ser::dump(&value, &options)
}

/// Convert any `T: Serialize` to a `LuaValue`.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::{to_value, LuaValue};
///
/// let value = to_value(&vec!["a", "b"]).unwrap();
/// assert_eq!(value, LuaValue::Sequence(vec!["a".into(), "b".into()]));
/// ```
///
/// # Errors
///
/// Returns an error if a map key is not a string or number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<LuaValue>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer::new())
}

/// Serialize any `T: Serialize` to a writer as indented table text.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, DumpOptions::default())
}

/// Serialize any `T: Serialize` to a writer with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: DumpOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Deserialize an instance of type `T` from table text.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{x = 1, y = 2}").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns the parse error for malformed text, or an error if the table does not have
/// the shape `T` expects. Parse errors carry the line and column.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(parse(s)?)
}

/// Deserialize an instance of type `T` from an I/O stream of table text.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::from_reader;
/// use std::io::Cursor;
///
/// let numbers: Vec<i32> = from_reader(Cursor::new(b"{1, 2, 3}")).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the text is malformed, or the table does not have
/// the shape `T` expects.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader.read_to_string(&mut string)?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of table text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, the text is malformed, or the
/// table does not have the shape `T` expects.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}
