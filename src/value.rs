//! Dynamic value tree walked by the encoder.
//!
//! Every input is first converted into a [`Value`] by the
//! [`ValueSerializer`](crate::ser::ValueSerializer). The tree keeps exactly the
//! shape information the encoder needs to derive namespaces:
//!
//! - **Scalars**: [`Value::Bool`], [`Value::Int`], [`Value::Uint`], [`Value::F32`],
//!   [`Value::F64`], [`Value::Str`] and [`Value::DateTime`]
//! - **Collections**: [`Value::Seq`] and [`Value::Map`]
//! - **Structs**: [`Value::Struct`], named or anonymous
//! - **Indirection**: [`Value::Indirect`] (an `Option` that was `Some`) and
//!   [`Value::Absent`] (`None` or `()`)
//! - **Named wrappers**: [`Value::Newtype`], which carries the serde type name
//!   so custom type functions can be looked up for it
//!
//! ## Examples
//!
//! ```rust
//! use form_encoder::{to_value, Kind, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: Option<i32> }
//!
//! let value = to_value(&Point { x: 1, y: Some(2) }).unwrap();
//! assert_eq!(value.kind(), Kind::Struct);
//! assert_eq!(value.field("x").and_then(Value::as_i64), Some(1));
//!
//! let (y, indirect) = value.field("y").unwrap().resolve();
//! assert!(indirect);
//! assert_eq!(y.as_i64(), Some(2));
//! ```

use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::borrow::Cow;
use std::fmt;

/// A dynamically-typed view of any serializable Rust value.
///
/// Custom type functions receive the `Value` of the node they were registered
/// for and can inspect it with the `as_*` accessors.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    Indirect(Box<Value>),
    Bool(bool),
    Int(i128),
    Uint(u128),
    F32(f32),
    F64(f64),
    Str(String),
    DateTime(DateTime<FixedOffset>),
    Newtype {
        name: &'static str,
        value: Box<Value>,
    },
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct {
        name: Option<&'static str>,
        fields: Vec<Field>,
    },
}

/// One struct field in declaration order.
///
/// Keys of derived structs are borrowed from the type; keys collected from a
/// `#[serde(flatten)]` field are owned.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: Value) -> Self {
        Field {
            key: key.into(),
            value,
        }
    }
}

/// The shape of a value once indirection has been stripped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Absent,
    Bool,
    Int,
    Uint,
    Float32,
    Float64,
    String,
    DateTime,
    Named,
    Seq,
    Map,
    Struct,
}

impl Kind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Kind::Absent => "absent",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::DateTime => "datetime",
            Kind::Named => "named",
            Kind::Seq => "sequence",
            Kind::Map => "map",
            Kind::Struct => "struct",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a type for custom function lookup and descriptor caching.
///
/// `Named` holds the name serde reports for a struct, newtype struct or unit
/// struct. `DateTime` is the date/time type written through
/// [`form_encoder::datetime`](crate::datetime).
///
/// # Examples
///
/// ```rust
/// use form_encoder::TypeKey;
///
/// assert_eq!(TypeKey::from("Money"), TypeKey::Named("Money"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Named(&'static str),
    DateTime,
}

impl From<&'static str> for TypeKey {
    fn from(name: &'static str) -> Self {
        TypeKey::Named(name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Named(name) => f.write_str(name),
            TypeKey::DateTime => f.write_str("DateTime"),
        }
    }
}

impl Value {
    /// Strips `Indirect` layers and reports whether any were crossed.
    ///
    /// A `None` at the end of the chain yields [`Value::Absent`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_encoder::Value;
    ///
    /// let value = Value::Indirect(Box::new(Value::Indirect(Box::new(Value::Bool(true)))));
    /// let (inner, indirect) = value.resolve();
    /// assert_eq!(inner, &Value::Bool(true));
    /// assert!(indirect);
    ///
    /// let (inner, indirect) = Value::Bool(false).resolve();
    /// assert_eq!(inner, &Value::Bool(false));
    /// assert!(!indirect);
    /// ```
    #[must_use]
    pub fn resolve(&self) -> (&Value, bool) {
        let mut current = self;
        let mut indirect = false;
        while let Value::Indirect(inner) = current {
            current = inner;
            indirect = true;
        }
        (current, indirect)
    }

    /// Returns the kind of the value after stripping indirection.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self.resolve().0 {
            Value::Absent | Value::Indirect(_) => Kind::Absent,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::F32(_) => Kind::Float32,
            Value::F64(_) => Kind::Float64,
            Value::Str(_) => Kind::String,
            Value::DateTime(_) => Kind::DateTime,
            Value::Newtype { .. } => Kind::Named,
            Value::Seq(_) => Kind::Seq,
            Value::Map(_) => Kind::Map,
            Value::Struct { .. } => Kind::Struct,
        }
    }

    /// The type identity of this exact node, if it has one.
    ///
    /// Anonymous structs, collections and primitives have no key.
    #[must_use]
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            Value::Struct {
                name: Some(name), ..
            }
            | Value::Newtype { name, .. } => Some(TypeKey::Named(*name)),
            Value::DateTime(_) => Some(TypeKey::DateTime),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.unwrap_named() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    ///
    /// Newtype wrappers and indirection are looked through.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_encoder::Value;
    ///
    /// assert_eq!(Value::from("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::from(42i64).as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self.unwrap_named() {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an integer that fits in `i64`, returns it.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.unwrap_named() {
            Value::Int(i) => i64::try_from(*i).ok(),
            Value::Uint(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// If the value is an integer that fits in `u64`, returns it.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self.unwrap_named() {
            Value::Int(i) => u64::try_from(*i).ok(),
            Value::Uint(u) => u64::try_from(*u).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.unwrap_named() {
            Value::F32(f) => Some(f64::from(*f)),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self.unwrap_named() {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self.unwrap_named() {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_fields(&self) -> Option<&[Field]> {
        match self.unwrap_named() {
            Value::Struct { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Looks up a struct field by its serialized key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.as_fields()?
            .iter()
            .find(|field| field.key == key)
            .map(|field| &field.value)
    }

    fn unwrap_named(&self) -> &Value {
        let mut current = self.resolve().0;
        while let Value::Newtype { value, .. } = current {
            current = value.resolve().0;
        }
        current
    }

    /// Formats a leaf value as a form string.
    ///
    /// Returns `None` for anything that is not a leaf. Named wrappers are not
    /// looked through, the encoder handles those itself.
    pub(crate) fn to_scalar_string(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Uint(u) => Some(u.to_string()),
            Value::F32(f) => Some(format_f32(*f)),
            Value::F64(f) => Some(format_f64(*f)),
            Value::DateTime(dt) => Some(format_datetime(dt)),
            _ => None,
        }
    }
}

// Display already yields the shortest round-trippable digits without an exponent.
fn format_f32(v: f32) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f32::INFINITY {
        "+Inf".to_string()
    } else if v == f32::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

fn format_f64(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// RFC 3339 with whole seconds, `Z` for UTC.
pub(crate) fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("<absent>"),
            Value::Indirect(inner) => write!(f, "{}", inner),
            Value::Newtype { value, .. } => write!(f, "{}", value),
            Value::Seq(items) => write!(f, "<sequence of {}>", items.len()),
            Value::Map(entries) => write!(f, "<map of {}>", entries.len()),
            Value::Struct {
                name: Some(name), ..
            } => write!(f, "<{} Value>", name),
            Value::Struct { name: None, .. } => f.write_str("<struct Value>"),
            scalar => match scalar.to_scalar_string() {
                Some(s) => f.write_str(&s),
                None => Ok(()),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i128::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u128::from(u))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::F64(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}
