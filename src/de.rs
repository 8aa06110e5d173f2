//! Deserialization from [`LuaValue`] trees.
//!
//! Text is parsed into a tree first (see [`crate::parse`]); this module then drives a
//! `Deserialize` implementation over that tree.
//!
//! ## Table shapes
//!
//! Lua has a single table type, so both shapes are accepted wherever either is asked
//! for as far as it makes sense:
//!
//! - a sequence requested as a map or struct is read as `{[1]=v1, [2]=v2, ...}`,
//!   skipping `nil` holes. This is also how `{}` reads as an empty struct
//! - integer keys read as strings when the target wants strings, and numeric string
//!   keys read as integers when the target wants numbers
//!
//! ```rust
//! use serde_luatable::from_str;
//! use std::collections::HashMap;
//!
//! let names: HashMap<String, String> = from_str("{'a', 'b'}").unwrap();
//! assert_eq!(names["2"], "b");
//!
//! let ports: HashMap<u16, bool> = from_str("{['80'] = true}").unwrap();
//! assert_eq!(ports[&80], true);
//! ```
//!
//! ## Enums
//!
//! Unit variants are strings, other variants are single-entry tables keyed by the
//! variant name:
//!
//! ```rust
//! use serde_luatable::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! enum Shape { Empty, Circle(f64) }
//!
//! let shapes: Vec<Shape> = from_str("{'Empty', {Circle = 2.5}}").unwrap();
//! assert_eq!(shapes, vec![Shape::Empty, Shape::Circle(2.5)]);
//! ```

use crate::{Error, Key, LuaMap, LuaValue, Number, Result};
use serde::de::{self, DeserializeOwned, IntoDeserializer, Unexpected};
use serde::forward_to_deserialize_any;

/// Converts a value tree into any `Deserialize` type.
///
/// # Errors
///
/// Returns an error if the tree does not have the shape `T` expects.
pub fn from_value<T>(value: LuaValue) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

/// A `serde` deserializer that owns a [`LuaValue`].
pub struct ValueDeserializer {
    value: LuaValue,
}

impl ValueDeserializer {
    pub fn new(value: LuaValue) -> Self {
        ValueDeserializer { value }
    }
}

fn unexpected(value: &LuaValue) -> Unexpected<'_> {
    match value {
        LuaValue::Nil => Unexpected::Unit,
        LuaValue::Bool(b) => Unexpected::Bool(*b),
        LuaValue::Number(Number::Integer(i)) => Unexpected::Signed(*i),
        LuaValue::Number(Number::Float(f)) => Unexpected::Float(*f),
        LuaValue::String(s) => Unexpected::Str(s),
        LuaValue::Sequence(_) => Unexpected::Seq,
        LuaValue::Table(_) => Unexpected::Map,
    }
}

/// Re-keys a sequence as `1, 2, ...`, leaving out `nil` holes.
pub(crate) fn sequence_to_map(seq: Vec<LuaValue>) -> LuaMap {
    seq.into_iter()
        .enumerate()
        .filter(|(_, value)| !value.is_nil())
        .map(|(i, value)| (Key::Integer(i as i64 + 1), value))
        .collect()
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::Nil => visitor.visit_unit(),
            LuaValue::Bool(b) => visitor.visit_bool(b),
            LuaValue::Number(Number::Integer(i)) => visitor.visit_i64(i),
            LuaValue::Number(Number::Float(f)) => visitor.visit_f64(f),
            LuaValue::String(s) => visitor.visit_string(s),
            LuaValue::Sequence(seq) => visitor.visit_seq(SeqDeserializer::new(seq)),
            LuaValue::Table(map) => visitor.visit_map(MapDeserializer::new(map)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::Nil => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::Table(map) => visitor.visit_map(MapDeserializer::new(map)),
            LuaValue::Sequence(seq) => {
                visitor.visit_map(MapDeserializer::new(sequence_to_map(seq)))
            }
            other => Err(de::Error::invalid_type(unexpected(&other), &visitor)),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::String(variant) => visitor.visit_enum(EnumDeserializer::new(variant, None)),
            LuaValue::Table(map) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((Key::String(variant), value)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, Some(value)))
                    }
                    _ => Err(Error::custom("enum variant name must be a string key")),
                }
            }
            other => Err(de::Error::invalid_type(unexpected(&other), &visitor)),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, Error> for LuaValue {
    type Deserializer = ValueDeserializer;

    fn into_deserializer(self) -> ValueDeserializer {
        ValueDeserializer::new(self)
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<LuaValue>,
}

impl SeqDeserializer {
    fn new(vec: Vec<LuaValue>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<Key, LuaValue>,
    value: Option<LuaValue>,
}

impl MapDeserializer {
    fn new(map: LuaMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(KeyDeserializer { key }).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Deserializes a table index, converting between number and string forms on request.
struct KeyDeserializer {
    key: Key,
}

impl KeyDeserializer {
    fn deserialize_number<'de, V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.key {
            Key::Integer(i) => visitor.visit_i64(i),
            Key::Float(f) => visitor.visit_f64(f),
            Key::String(s) => {
                if let Ok(i) = s.trim().parse::<i64>() {
                    visitor.visit_i64(i)
                } else if let Ok(f) = s.trim().parse::<f64>() {
                    visitor.visit_f64(f)
                } else {
                    visitor.visit_string(s)
                }
            }
        }
    }
}

macro_rules! deserialize_numeric_key {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                self.deserialize_number(visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.key {
            Key::Integer(i) => visitor.visit_i64(i),
            Key::Float(f) => visitor.visit_f64(f),
            Key::String(s) => visitor.visit_string(s),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.key {
            Key::String(s) => visitor.visit_string(s),
            other => visitor.visit_string(other.to_string()),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    deserialize_numeric_key! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_f32 deserialize_f64
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let variant: String = match self.key {
            Key::String(s) => s,
            other => other.to_string(),
        };
        let variant: de::value::StringDeserializer<Error> = variant.into_deserializer();
        visitor.visit_enum(variant)
    }

    forward_to_deserialize_any! {
        bool i128 u128 char bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct ignored_any
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<LuaValue>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Option<LuaValue>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(LuaValue::String(self.variant)))?;
        let visitor = VariantDeserializer { value: self.value };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer {
    value: Option<LuaValue>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(LuaValue::Nil) | None => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(LuaValue::Sequence(seq)) => visitor.visit_seq(SeqDeserializer::new(seq)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(LuaValue::Table(map)) => visitor.visit_map(MapDeserializer::new(map)),
            Some(LuaValue::Sequence(seq)) => {
                visitor.visit_map(MapDeserializer::new(sequence_to_map(seq)))
            }
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}
