//! Dynamic value representation for Lua table data.
//!
//! This module provides the [`LuaValue`] enum which represents anything a Lua table
//! literal can hold, the [`Number`] type shared by values and keys, and the [`Key`]
//! type used to index mapping-shaped tables.
//!
//! ## Table shapes
//!
//! A parsed table literal collapses into one of two shapes:
//!
//! - [`LuaValue::Sequence`] when no field carries a key (`{1, 2, nil, 4}`)
//! - [`LuaValue::Table`] when at least one keyed field survives evaluation
//!   (`{x = 1, "a"}` becomes `{x: 1, 1: "a"}`)
//!
//! ## Examples
//!
//! ```rust
//! use serde_luatable::{parse, LuaValue, Number};
//!
//! let value = parse("{1, 2.5, 'three'}").unwrap();
//! let seq = value.as_sequence().unwrap();
//! assert_eq!(seq[0], LuaValue::Number(Number::Integer(1)));
//! assert_eq!(seq[1].as_f64(), Some(2.5));
//! assert_eq!(seq[2].as_str(), Some("three"));
//! ```

use crate::{Error, LuaMap, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A dynamically-typed representation of any value a Lua table literal can hold.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::{LuaValue, Number};
///
/// let nil = LuaValue::Nil;
/// let num = LuaValue::Number(Number::Integer(42));
/// let text = LuaValue::String("hello".to_string());
///
/// assert!(nil.is_nil());
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum LuaValue {
    #[default]
    Nil,
    Bool(bool),
    Number(Number),
    String(String),
    /// Keyless fields in order; stored 0-based, addressed 1-based. May hold `Nil` holes.
    Sequence(Vec<LuaValue>),
    Table(LuaMap),
}

/// A Lua numeral, kept as an integer whenever the literal reads as one.
///
/// # Examples
///
/// ```rust
/// use serde_luatable::Number;
///
/// assert_eq!(Number::from_numeral("42").unwrap(), Number::Integer(42));
/// assert_eq!(Number::from_numeral("4.5e1").unwrap(), Number::Float(45.0));
/// assert!(Number::from_numeral("forty").is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Converts numeral text into a number, trying an integer interpretation first.
    ///
    /// Only decimal digits, signs, a decimal point and an `e`/`E` exponent are accepted;
    /// integers that overflow `i64` fall back to floating point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotANumber`] carrying the text when it is not a decimal numeral.
    pub fn from_numeral(text: &str) -> Result<Number> {
        let numeral_chars = text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
        if text.is_empty() || !numeral_chars {
            return Err(Error::NotANumber(text.to_string()));
        }

        if let Ok(i) = text.parse::<i64>() {
            return Ok(Number::Integer(i));
        }
        text.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| Error::NotANumber(text.to_string()))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Converts this number to an `i64` if it has no fractional part.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_luatable::Number;
    ///
    /// assert_eq!(Number::Integer(42).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.5).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }
}

/// Writes the numeral the way it appears in table text.
///
/// Floats always carry a decimal point or exponent so that they read back as floats;
/// infinities use an overflowing literal.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) if fl.is_nan() => f.write_str("nan"),
            Number::Float(fl) if fl.is_infinite() => {
                f.write_str(if *fl > 0.0 { "1e999" } else { "-1e999" })
            }
            Number::Float(fl) => write!(f, "{:?}", fl),
        }
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(value as i64)
                }
            }

            impl From<$ty> for LuaValue {
                fn from(value: $ty) -> Self {
                    LuaValue::Number(Number::Integer(value as i64))
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(value as f64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// A table index: a number or a string.
///
/// Numeric keys compare by value: a float with an integral value in `i64` range is the
/// same key as that integer, so `Key::Float(1.0) == Key::Integer(1)`. Conversions from
/// numbers fold such floats to [`Key::Integer`]. Other floats compare by bit pattern.
#[derive(Clone, Debug)]
pub enum Key {
    Integer(i64),
    Float(f64),
    String(String),
}

impl Key {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Key::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }

    fn integral(&self) -> Option<i64> {
        match self {
            Key::Integer(i) => Some(*i),
            Key::Float(f) => float_to_integer(*f),
            Key::String(_) => None,
        }
    }
}

// i64::MIN is exact in f64; its negation is one past i64::MAX.
fn float_to_integer(f: f64) -> Option<i64> {
    let bound = -(i64::MIN as f64);
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < bound {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::String(a), Key::String(b)) => a == b,
            (Key::Float(a), Key::Float(b)) if self.integral().is_none() => {
                a.to_bits() == b.to_bits()
            }
            _ => match (self.integral(), other.integral()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(i) = self.integral() {
            0u8.hash(state);
            i.hash(state);
            return;
        }
        match self {
            Key::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state);
            }
            Key::String(s) => {
                2u8.hash(state);
                s.hash(state);
            }
            Key::Integer(i) => i.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Integer(i) => write!(f, "{}", i),
            Key::Float(fl) => write!(f, "{}", Number::Float(*fl)),
            Key::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<Number> for Key {
    fn from(value: Number) -> Self {
        match value {
            Number::Integer(i) => Key::Integer(i),
            Number::Float(f) => Key::from(f),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Integer(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Integer(value as i64)
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        float_to_integer(value).map_or(Key::Float(value), Key::Integer)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Key::Integer(i) => serializer.serialize_i64(*i),
            Key::Float(f) => serializer.serialize_f64(*f),
            Key::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = Key;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or number table index")
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Key, E> {
                Ok(Key::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Key, E> {
                Ok(i64::try_from(value)
                    .map(Key::Integer)
                    .unwrap_or(Key::Float(value as f64)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Key, E> {
                Ok(Key::from(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Key, E>
            where
                E: de::Error,
            {
                Ok(Key::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Key, E> {
                Ok(Key::String(value))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

impl LuaValue {
    #[inline]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, LuaValue::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, LuaValue::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, LuaValue::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, LuaValue::Sequence(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, LuaValue::Table(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LuaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            LuaValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is an integer or a whole-number float, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_luatable::{LuaValue, Number};
    ///
    /// assert_eq!(LuaValue::Number(Number::Integer(42)).as_i64(), Some(42));
    /// assert_eq!(LuaValue::Number(Number::Float(42.5)).as_i64(), None);
    /// assert_eq!(LuaValue::Bool(true).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(|n| n.as_i64())
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&Vec<LuaValue>> {
        match self {
            LuaValue::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&LuaMap> {
        match self {
            LuaValue::Table(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            LuaValue::Nil => "nil",
            LuaValue::Bool(_) => "boolean",
            LuaValue::Number(_) => "number",
            LuaValue::String(_) => "string",
            LuaValue::Sequence(_) => "sequence",
            LuaValue::Table(_) => "table",
        }
    }
}

/// Renders the value as compact table text, or its debug form if it has none (NaN).
impl fmt::Display for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match crate::ser::dump(self, &crate::DumpOptions::compact()) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

impl Serialize for LuaValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            LuaValue::Nil => serializer.serialize_unit(),
            LuaValue::Bool(b) => serializer.serialize_bool(*b),
            LuaValue::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            LuaValue::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            LuaValue::String(s) => serializer.serialize_str(s),
            LuaValue::Sequence(seq) => {
                use serde::ser::SerializeSeq;
                let mut out = serializer.serialize_seq(Some(seq.len()))?;
                for element in seq {
                    out.serialize_element(element)?;
                }
                out.end()
            }
            LuaValue::Table(map) => {
                use serde::ser::SerializeMap;
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for LuaValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct LuaValueVisitor;

        impl<'de> Visitor<'de> for LuaValueVisitor {
            type Value = LuaValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid Lua table value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<LuaValue, E> {
                Ok(LuaValue::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<LuaValue, E> {
                Ok(LuaValue::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<LuaValue, E> {
                if value <= i64::MAX as u64 {
                    Ok(LuaValue::Number(Number::Integer(value as i64)))
                } else {
                    Ok(LuaValue::Number(Number::Float(value as f64)))
                }
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<LuaValue, E> {
                Ok(LuaValue::Number(Number::Float(value)))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<LuaValue, E> {
                Ok(LuaValue::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<LuaValue, E> {
                Ok(LuaValue::String(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<LuaValue, E> {
                Ok(LuaValue::Nil)
            }

            fn visit_none<E>(self) -> std::result::Result<LuaValue, E> {
                Ok(LuaValue::Nil)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<LuaValue, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<LuaValue, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(LuaValue::Sequence(vec))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<LuaValue, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = LuaMap::new();
                while let Some((key, value)) = map.next_entry::<Key, LuaValue>()? {
                    values.insert(key, value);
                }
                Ok(LuaValue::Table(values))
            }
        }

        deserializer.deserialize_any(LuaValueVisitor)
    }
}

impl TryFrom<LuaValue> for i64 {
    type Error = Error;

    fn try_from(value: LuaValue) -> Result<Self> {
        match value.as_i64() {
            Some(i) => Ok(i),
            None => Err(Error::custom(format!("expected integer, found {:?}", value))),
        }
    }
}

impl TryFrom<LuaValue> for f64 {
    type Error = Error;

    fn try_from(value: LuaValue) -> Result<Self> {
        match value {
            LuaValue::Number(n) => Ok(n.as_f64()),
            _ => Err(Error::custom(format!("expected number, found {:?}", value))),
        }
    }
}

impl TryFrom<LuaValue> for bool {
    type Error = Error;

    fn try_from(value: LuaValue) -> Result<Self> {
        match value {
            LuaValue::Bool(b) => Ok(b),
            _ => Err(Error::custom(format!("expected boolean, found {:?}", value))),
        }
    }
}

impl TryFrom<LuaValue> for String {
    type Error = Error;

    fn try_from(value: LuaValue) -> Result<Self> {
        match value {
            LuaValue::String(s) => Ok(s),
            _ => Err(Error::custom(format!("expected string, found {:?}", value))),
        }
    }
}

impl From<bool> for LuaValue {
    fn from(value: bool) -> Self {
        LuaValue::Bool(value)
    }
}

impl From<f32> for LuaValue {
    fn from(value: f32) -> Self {
        LuaValue::Number(Number::Float(value as f64))
    }
}

impl From<f64> for LuaValue {
    fn from(value: f64) -> Self {
        LuaValue::Number(Number::Float(value))
    }
}

impl From<Number> for LuaValue {
    fn from(value: Number) -> Self {
        LuaValue::Number(value)
    }
}

impl From<String> for LuaValue {
    fn from(value: String) -> Self {
        LuaValue::String(value)
    }
}

impl From<&str> for LuaValue {
    fn from(value: &str) -> Self {
        LuaValue::String(value.to_string())
    }
}

impl From<Vec<LuaValue>> for LuaValue {
    fn from(value: Vec<LuaValue>) -> Self {
        LuaValue::Sequence(value)
    }
}

impl From<LuaMap> for LuaValue {
    fn from(value: LuaMap) -> Self {
        LuaValue::Table(value)
    }
}

impl From<Key> for LuaValue {
    fn from(value: Key) -> Self {
        match value {
            Key::Integer(i) => LuaValue::Number(Number::Integer(i)),
            Key::Float(f) => LuaValue::Number(Number::Float(f)),
            Key::String(s) => LuaValue::String(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_numeral_integer_first() {
        assert_eq!(Number::from_numeral("7").unwrap(), Number::Integer(7));
        assert_eq!(Number::from_numeral("-7").unwrap(), Number::Integer(-7));
        assert_eq!(Number::from_numeral("+7").unwrap(), Number::Integer(7));
        assert_eq!(Number::from_numeral("7.0").unwrap(), Number::Float(7.0));
        assert_eq!(Number::from_numeral(".5").unwrap(), Number::Float(0.5));
        assert_eq!(Number::from_numeral("1E-2").unwrap(), Number::Float(0.01));
    }

    #[test]
    fn test_numeral_overflow_falls_back_to_float() {
        let n = Number::from_numeral("99999999999999999999").unwrap();
        assert!(n.is_float());
    }

    #[test]
    fn test_numeral_rejects_words() {
        for text in ["", "inf", "nan", "0x10", "abc", "1_000"] {
            assert!(
                matches!(Number::from_numeral(text), Err(Error::NotANumber(ref t)) if t == text),
                "{text:?} should not convert"
            );
        }
    }

    #[test]
    fn test_float_display_reads_back_as_float() {
        assert_eq!(Number::Float(2.0).to_string(), "2.0");
        assert_eq!(Number::Float(54.33).to_string(), "54.33");
        assert_eq!(Number::Float(1e21).to_string(), "1e21");
        assert_eq!(Number::Float(f64::INFINITY).to_string(), "1e999");
        assert_eq!(Number::Float(f64::NEG_INFINITY).to_string(), "-1e999");
        for n in [2.0, 54.33, 1e21, 1e-7, -0.25] {
            let text = Number::Float(n).to_string();
            assert_eq!(Number::from_numeral(&text).unwrap(), Number::Float(n));
        }
    }

    #[test]
    fn test_key_integral_float_equals_integer() {
        let mut keys = HashSet::new();
        keys.insert(Key::Integer(1));
        keys.insert(Key::Float(1.0));
        keys.insert(Key::Float(-0.0));
        keys.insert(Key::Integer(0));
        keys.insert(Key::Float(1.5));
        keys.insert(Key::Float(1.5));
        keys.insert(Key::from("1"));
        assert_eq!(keys.len(), 4);
        assert_ne!(Key::Float(1.5), Key::Integer(1));
    }

    #[test]
    fn test_key_from_float_folds_integral_values() {
        assert!(matches!(Key::from(3.0), Key::Integer(3)));
        assert!(matches!(Key::from(Number::Float(-2.0)), Key::Integer(-2)));
        assert!(matches!(Key::from(2.5), Key::Float(_)));
        assert!(matches!(Key::from(1e19), Key::Float(_)));
        assert!(matches!(Key::from(f64::INFINITY), Key::Float(_)));
        assert!(matches!(Key::from(f64::NAN), Key::Float(_)));
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(LuaValue::from(42)).unwrap(), 42);
        assert_eq!(i64::try_from(LuaValue::from(42.0)).unwrap(), 42);
        assert!(i64::try_from(LuaValue::from("42")).is_err());
        assert_eq!(f64::try_from(LuaValue::from(3)).unwrap(), 3.0);
        assert!(bool::try_from(LuaValue::from(1)).is_err());
        assert_eq!(String::try_from(LuaValue::from("x")).unwrap(), "x");
    }

    #[test]
    fn test_bool_is_not_a_number() {
        let value = LuaValue::from(true);
        assert!(value.is_bool());
        assert!(!value.is_number());
        assert_eq!(value.as_i64(), None);
    }

    #[test]
    fn test_display_is_compact_text() {
        let value = LuaValue::Sequence(vec![LuaValue::from(1), LuaValue::Nil, LuaValue::from("a")]);
        assert_eq!(value.to_string(), "{1,nil,\"a\"}");
    }
}
