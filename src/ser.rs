//! Lua table serialization.
//!
//! This module turns [`LuaValue`] trees into table-constructor text, and Rust values
//! implementing `Serialize` into [`LuaValue`] trees.
//!
//! ## Layout
//!
//! - Sequences are written inline: `{1,2,"three",nil}`
//! - Mappings use bracketed indices: `{["x"]= 1, [2]= true}`. With a non-zero indent
//!   factor and more than one entry, every entry goes on its own line
//! - Tables nested in a sequence are always written inline
//!
//! ```rust
//! use serde_luatable::{parse, ser::dump, DumpOptions};
//!
//! let value = parse("{name = 'box', size = {2, 3}}").unwrap();
//! assert_eq!(
//!     dump(&value, &DumpOptions::new()).unwrap(),
//!     "{\n    [\"name\"]= \"box\",\n    [\"size\"]= {2,3}\n}"
//! );
//! ```
//!
//! ## From Rust values
//!
//! ```rust
//! use serde_luatable::{to_value, Key, LuaValue};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let value = to_value(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(value.as_table().unwrap().get(&Key::from("y")), Some(&LuaValue::from(2)));
//! ```

use crate::{escape, DumpOptions, Error, Key, LuaMap, LuaValue, Number, Result};
use serde::{ser, Serialize};

/// Writes [`LuaValue`] trees as table text.
pub struct Serializer {
    output: String,
    options: DumpOptions,
}

impl Serializer {
    pub fn new(options: DumpOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Appends `value` at the top level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for NaN numbers or keys.
    pub fn write(&mut self, value: &LuaValue) -> Result<()> {
        let factor = self.options.indent;
        self.write_value(value, factor, 0)
    }

    fn write_value(&mut self, value: &LuaValue, factor: usize, indent: usize) -> Result<()> {
        match value {
            LuaValue::Nil => self.output.push_str("nil"),
            LuaValue::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            LuaValue::Number(n) => self.write_number(*n)?,
            LuaValue::String(s) => escape::write_quoted(&mut self.output, s),
            LuaValue::Sequence(seq) => self.write_sequence(seq)?,
            LuaValue::Table(map) => self.write_table(map, factor, indent)?,
        }
        Ok(())
    }

    fn write_number(&mut self, n: Number) -> Result<()> {
        if matches!(n, Number::Float(f) if f.is_nan()) {
            return Err(Error::serialization("NaN has no table literal form"));
        }
        self.output.push_str(&n.to_string());
        Ok(())
    }

    fn write_sequence(&mut self, seq: &[LuaValue]) -> Result<()> {
        self.output.push('{');
        for (i, element) in seq.iter().enumerate() {
            if i > 0 {
                self.output.push(',');
            }
            self.write_value(element, 0, 0)?;
        }
        self.output.push('}');
        Ok(())
    }

    fn write_table(&mut self, map: &LuaMap, factor: usize, indent: usize) -> Result<()> {
        self.output.push('{');

        if map.len() == 1 {
            for (key, value) in map.iter() {
                self.write_entry(key, value, factor, indent)?;
            }
        } else if !map.is_empty() {
            let inner = indent + factor;
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    self.output.push(',');
                }
                if factor > 0 {
                    self.output.push('\n');
                }
                self.push_indent(inner);
                self.write_entry(key, value, factor, inner)?;
            }
            if factor > 0 {
                self.output.push('\n');
            }
            self.push_indent(indent);
        }

        self.output.push('}');
        Ok(())
    }

    fn write_entry(
        &mut self,
        key: &Key,
        value: &LuaValue,
        factor: usize,
        indent: usize,
    ) -> Result<()> {
        self.write_index(key)?;
        self.output.push('=');
        if factor > 0 {
            self.output.push(' ');
        }
        self.write_value(value, factor, indent)
    }

    fn write_index(&mut self, key: &Key) -> Result<()> {
        self.output.push('[');
        match key {
            Key::Integer(i) => self.output.push_str(&i.to_string()),
            Key::Float(f) => self.write_number(Number::Float(*f))?,
            Key::String(s) => escape::write_quoted(&mut self.output, s),
        }
        self.output.push(']');
        Ok(())
    }

    fn push_indent(&mut self, columns: usize) {
        self.output.extend(std::iter::repeat(' ').take(columns));
    }
}

/// Dumps a value tree as table text.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the tree contains a NaN number or key.
pub fn dump(value: &LuaValue, options: &DumpOptions) -> Result<String> {
    let mut serializer = Serializer::new(options.clone());
    serializer.write(value)?;
    Ok(serializer.into_inner())
}

/// Builds [`LuaValue`] trees from `Serialize` types.
///
/// Maps and structs become tables and sequences become sequences. Entries whose value is
/// `None`/unit are left out of tables, since a table cannot hold `nil`. Map keys must be
/// strings or numbers; with `drop_invalid_keys` set, entries with other keys are skipped
/// instead of failing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueSerializer {
    pub drop_invalid_keys: bool,
}

impl ValueSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        ValueSerializer {
            drop_invalid_keys: true,
        }
    }

    fn single_entry(self, variant: &str, value: LuaValue) -> LuaValue {
        let mut map = LuaMap::with_capacity(1);
        if !value.is_nil() {
            map.insert(Key::from(variant), value);
        }
        LuaValue::Table(map)
    }
}

pub struct SerializeVec {
    ser: ValueSerializer,
    vec: Vec<LuaValue>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    ser: ValueSerializer,
    map: LuaMap,
    // Some(None): the pending entry has a key that is being dropped.
    current_key: Option<Option<Key>>,
    variant: Option<&'static str>,
}

impl SerializeVec {
    fn new(ser: ValueSerializer, variant: Option<&'static str>) -> Self {
        SerializeVec {
            ser,
            vec: Vec::new(),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(value.serialize(self.ser)?);
        Ok(())
    }

    fn finish(self) -> LuaValue {
        let seq = LuaValue::Sequence(self.vec);
        match self.variant {
            Some(variant) => self.ser.single_entry(variant, seq),
            None => seq,
        }
    }
}

impl SerializeMap {
    fn new(ser: ValueSerializer, variant: Option<&'static str>) -> Self {
        SerializeMap {
            ser,
            map: LuaMap::new(),
            current_key: None,
            variant,
        }
    }

    fn insert<T: ?Sized + Serialize>(&mut self, key: Key, value: &T) -> Result<()> {
        let value = value.serialize(self.ser)?;
        if !value.is_nil() {
            self.map.insert(key, value);
        }
        Ok(())
    }

    fn finish(self) -> LuaValue {
        let table = LuaValue::Table(self.map);
        match self.variant {
            Some(variant) => self.ser.single_entry(variant, table),
            None => table,
        }
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = LuaValue;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<LuaValue> {
        Ok(LuaValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<LuaValue> {
        if v <= i64::MAX as u64 {
            Ok(LuaValue::Number(Number::Integer(v as i64)))
        } else {
            Ok(LuaValue::Number(Number::Float(v as f64)))
        }
    }

    fn serialize_f32(self, v: f32) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_char(self, v: char) -> Result<LuaValue> {
        Ok(LuaValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<LuaValue> {
        Ok(LuaValue::Sequence(v.iter().map(|&b| LuaValue::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<LuaValue> {
        Ok(LuaValue::Nil)
    }

    fn serialize_some<T>(self, value: &T) -> Result<LuaValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<LuaValue> {
        Ok(LuaValue::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<LuaValue> {
        Ok(LuaValue::Nil)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<LuaValue> {
        Ok(LuaValue::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<LuaValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<LuaValue>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(self)?;
        Ok(self.single_entry(variant, inner))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self, None))
    }

    fn serialize_tuple(self, _len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(self, None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(self, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(self, Some(variant)))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match key.serialize(self.ser)? {
            LuaValue::String(s) => Some(Key::String(s)),
            LuaValue::Number(n) => Some(Key::from(n)),
            _ if self.ser.drop_invalid_keys => None,
            other => {
                return Err(Error::serialization(format!(
                    "table index must be a string or a number, found {}",
                    other.type_name()
                )))
            }
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match self.current_key.take() {
            Some(Some(key)) => self.insert(key, value),
            Some(None) => Ok(()),
            None => Err(Error::custom("serialize_value called without serialize_key")),
        }
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(Key::from(key), value)
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(Key::from(key), value)
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}
