//! Conversion of any `T: Serialize` into a [`Value`] tree.
//!
//! [`ValueSerializer`] is the front end of the encoder: it records the shape
//! of the input once, and the traversal in [`crate::encoder`] derives
//! namespaces from that shape.
//!
//! ## Shape mapping
//!
//! - `None` and `()` become [`Value::Absent`], `Some(x)` becomes [`Value::Indirect`]
//! - Newtype and unit structs keep their name in [`Value::Newtype`]
//! - Sequences, tuples and byte strings become [`Value::Seq`]; tuple structs
//!   wrap theirs in a named [`Value::Newtype`]
//! - Structs keep their name and fields in declaration order. Fields omitted
//!   through `skip_serializing_if` stay in place as [`Value::Absent`]
//! - Unit variants become their variant name; other variants become an
//!   anonymous struct with a single field named after the variant
//! - Structs with a `#[serde(flatten)]` field reach the serializer as a map
//!   of unknown length with string keys and become an anonymous struct, so
//!   both their own and their flattened fields use the separator
//!
//! ## Examples
//!
//! ```rust
//! use form_encoder::{to_value, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Money(i64);
//!
//! let value = to_value(&Money(5)).unwrap();
//! assert_eq!(
//!     value,
//!     Value::Newtype { name: "Money", value: Box::new(Value::Int(5)) }
//! );
//! ```

use crate::datetime::DATETIME_NAME;
use crate::value::Field;
use crate::{Error, Result, Value};
use chrono::{DateTime, FixedOffset};
use serde::{ser, Serialize};

/// Serializer producing a [`Value`].
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeTupleStruct {
    name: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeMap {
    entries: Vec<(Value, Value)>,
    current_key: Option<Value>,
    sized: bool,
}

pub struct SerializeStruct {
    name: Option<&'static str>,
    fields: Vec<Field>,
}

pub struct SerializeStructVariant {
    variant: &'static str,
    fields: Vec<Field>,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeTupleStruct;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(i128::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Uint(u128::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::Uint(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::F32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let vec = v.iter().map(|&b| Value::Uint(u128::from(b))).collect();
        Ok(Value::Seq(vec))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Absent)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(Value::Indirect(Box::new(value.serialize(self)?)))
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Absent)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Ok(Value::Newtype {
            name,
            value: Box::new(Value::Absent),
        })
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::Str(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(self)?;
        if name == DATETIME_NAME {
            return match inner {
                Value::Str(s) => parse_datetime(&s)
                    .map(Value::DateTime)
                    .ok_or(Error::InvalidDateTime(s)),
                other => Err(Error::InvalidDateTime(other.to_string())),
            };
        }
        Ok(Value::Newtype {
            name,
            value: Box::new(inner),
        })
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(variant_struct(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<SerializeTupleStruct> {
        Ok(SerializeTupleStruct {
            name,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            current_key: None,
            sized: len.is_some(),
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeStruct> {
        // Hand-written impls sometimes pass an empty name; treat those as anonymous.
        Ok(SerializeStruct {
            name: (!name.is_empty()).then_some(name),
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            fields: Vec::with_capacity(len),
        })
    }
}

impl SerializeVec {
    fn new(capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Seq(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeTupleStruct {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    // Keeps the type name so custom functions can match tuple structs.
    fn end(self) -> Result<Value> {
        Ok(Value::Newtype {
            name: self.name,
            value: Box::new(Value::Seq(self.vec)),
        })
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(variant_struct(self.variant, Value::Seq(self.vec)))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(to_value(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.push((key, to_value(value)?));
        Ok(())
    }

    // Derived structs with a `#[serde(flatten)]` field arrive here as an
    // unsized map of string keys. They stay structs.
    fn end(self) -> Result<Value> {
        let string_keyed = self
            .entries
            .iter()
            .all(|(key, _)| matches!(key, Value::Str(_)));
        if self.sized || !string_keyed {
            return Ok(Value::Map(self.entries));
        }

        let fields = self
            .entries
            .into_iter()
            .filter_map(|(key, value)| match key {
                Value::Str(key) => Some(Field::new(key, value)),
                _ => None,
            })
            .collect();
        Ok(Value::Struct { name: None, fields })
    }
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push(Field::new(key, to_value(value)?));
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        self.fields.push(Field::new(key, Value::Absent));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Struct {
            name: self.name,
            fields: self.fields,
        })
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push(Field::new(key, to_value(value)?));
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        self.fields.push(Field::new(key, Value::Absent));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let inner = Value::Struct {
            name: None,
            fields: self.fields,
        };
        Ok(variant_struct(self.variant, inner))
    }
}

/// Years outside 0..=9999 carry a sign, which RFC 3339 itself rejects.
const SIGNED_YEAR_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, SIGNED_YEAR_FORMAT))
        .ok()
}

/// Externally tagged layout: `{ variant: value }`.
fn variant_struct(variant: &'static str, value: Value) -> Value {
    Value::Struct {
        name: None,
        fields: vec![Field::new(variant, value)],
    }
}

pub(crate) fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}
