//! Evaluation of read fields into [`LuaValue`] trees.
//!
//! The reader leaves values as [`Expr`] syntax; this module gives them meaning and merges
//! each table's fields into one of the two table shapes:
//!
//! - no keyed field survives → [`LuaValue::Sequence`], `Nil` holes kept
//! - otherwise → [`LuaValue::Table`]: keyed fields first (later duplicates overwrite
//!   earlier ones, `Nil` values dropped), then positional fields under keys `1, 2, ...`
//!   in field order, skipping `Nil` holes and never replacing an explicit key
//!
//! ## Examples
//!
//! ```rust
//! use serde_luatable::{parse, Key, LuaValue};
//!
//! let value = parse(r#"{x=10, y=45; "one", "two", "three"}"#).unwrap();
//! let table = value.as_table().unwrap();
//! assert_eq!(table.get(&Key::from(1)), Some(&LuaValue::from("one")));
//! assert_eq!(table.get(&Key::from("x")), Some(&LuaValue::from(10)));
//! ```

use crate::reader::{Expr, Field, Reader};
use crate::{Key, LuaMap, LuaValue, ParseOptions, Result};

/// Parses the first table constructor in `text`.
///
/// # Errors
///
/// Returns the first syntax or lexical error met while reading.
pub fn parse(text: &str) -> Result<LuaValue> {
    parse_with_options(text, &ParseOptions::default())
}

/// Parses the first table constructor in `text` with a custom nesting limit.
///
/// # Errors
///
/// Returns the first syntax or lexical error met while reading, including
/// `TooDeeplyNested` past `options.max_depth`.
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<LuaValue> {
    let mut reader = Reader::with_options(text, options);
    let fields = reader.next_table()?;
    Ok(evaluate_table(fields))
}

/// Gives a value expression its meaning.
///
/// Bare words other than `nil`, `true` and `false` evaluate to `Nil`.
pub fn evaluate_expr(expr: Expr<'_>) -> LuaValue {
    match expr {
        Expr::Word("true") => LuaValue::Bool(true),
        Expr::Word("false") => LuaValue::Bool(false),
        Expr::Word(_) => LuaValue::Nil,
        Expr::Number(n) => LuaValue::Number(n),
        Expr::String(s) => LuaValue::String(s),
        Expr::Table(fields) => evaluate_table(fields),
    }
}

/// Evaluates a table's fields and merges them into a single value.
pub fn evaluate_table(fields: Vec<Field<'_>>) -> LuaValue {
    let mut sequence = Vec::new();
    let mut mapping = LuaMap::new();

    for field in fields {
        let value = evaluate_expr(field.value);
        match field.key {
            None => sequence.push(value),
            Some(_) if value.is_nil() => {}
            Some(key) => {
                mapping.insert(key, value);
            }
        }
    }

    merge_fields(sequence, mapping)
}

/// Merges the positional and keyed parts of a table.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::eval::merge_fields;
/// use serde_luatable::{Key, LuaMap, LuaValue};
///
/// let mut mapping = LuaMap::new();
/// mapping.insert(Key::from(1), LuaValue::from("explicit"));
///
/// let merged = merge_fields(vec![LuaValue::from("positional")], mapping);
/// let table = merged.as_table().unwrap();
/// assert_eq!(table.get(&Key::from(1)), Some(&LuaValue::from("explicit")));
/// ```
pub fn merge_fields(sequence: Vec<LuaValue>, mut mapping: LuaMap) -> LuaValue {
    if mapping.is_empty() {
        return LuaValue::Sequence(sequence);
    }

    for (i, value) in sequence.into_iter().enumerate() {
        if !value.is_nil() {
            mapping.insert_if_absent(Key::Integer(i as i64 + 1), value);
        }
    }
    LuaValue::Table(mapping)
}
