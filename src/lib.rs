//! # form_encoder
//!
//! A Serde-compatible encoder that flattens arbitrarily nested Rust values into
//! string key/value pairs for URL and form encoding.
//!
//! ## Key Features
//!
//! - **Namespaced keys**: nested structs, sequences and maps become keys such as
//!   `Parent.Child[2].Name` or `Tags[key1]`
//! - **Repeated values**: an unindexed `Vec` of scalars encodes as repeated
//!   values under one key (`tags=a&tags=b`)
//! - **Serde Compatible**: works with any `#[derive(Serialize)]` type;
//!   `#[serde(rename)]` and `#[serde(skip)]` act as field tags
//! - **Custom type functions**: take over encoding for specific types
//! - **Partial results**: per-namespace failures are collected, the rest of the
//!   value is still encoded
//! - **Cached field metadata**: struct descriptors are computed once per encoder
//!   and shared across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use form_encoder::to_values;
//! use serde::Serialize;
//! use std::collections::BTreeMap;
//!
//! #[derive(Serialize)]
//! struct Form {
//!     #[serde(rename = "Name")]
//!     name: String,
//!     #[serde(rename = "Tags")]
//!     tags: Vec<String>,
//!     #[serde(rename = "Meta")]
//!     meta: BTreeMap<String, i32>,
//! }
//!
//! let mut meta = BTreeMap::new();
//! meta.insert("k".to_string(), 1);
//!
//! let form = Form {
//!     name: "x".to_string(),
//!     tags: vec!["a".to_string(), "b".to_string()],
//!     meta,
//! };
//!
//! let values = to_values(&form).unwrap();
//! assert_eq!(values.get("Name"), Some("x"));
//! assert_eq!(values.get_all("Tags").unwrap(), &["a", "b"]);
//! assert_eq!(values.get("Meta[k]"), Some("1"));
//! ```
//!
//! ## Reusing an Encoder
//!
//! [`to_values`] builds a fresh [`Encoder`] per call. Long-lived code should
//! keep one encoder around: it caches struct descriptors and holds custom type
//! functions.
//!
//! ```rust
//! use form_encoder::{Encoder, EncoderOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Query { page: u32, #[serde(rename = "-")] session: String }
//!
//! let encoder = Encoder::with_options(EncoderOptions::new().with_sorted_map_keys(true));
//! let query = Query { page: 2, session: "secret".to_string() };
//! assert_eq!(encoder.encode(&query).unwrap().to_query_string(), "page=2");
//! ```
//!
//! ## Modules
//!
//! - [`encoder`]: the [`Encoder`] and its traversal
//! - [`value`]: the [`Value`] tree every input is converted into first
//! - [`cache`]: struct descriptors and their concurrent cache
//! - [`custom`]: the custom type function registry
//! - [`datetime`]: serde helpers for `chrono::DateTime` fields

pub mod cache;
pub mod custom;
pub mod datetime;
pub mod encoder;
pub mod error;
pub mod options;
pub mod ser;
pub mod value;
pub mod values;

pub use custom::{type_key_of, CustomTypeFunc, CustomTypeRegistry};
pub use encoder::Encoder;
pub use error::{EncodeErrors, Error, Result};
pub use options::EncoderOptions;
pub use ser::ValueSerializer;
pub use value::{Field, Kind, TypeKey, Value};
pub use values::Values;

use serde::Serialize;

/// Encode any struct-shaped `T: Serialize` into form values.
///
/// # Examples
///
/// ```rust
/// use form_encoder::to_values;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let values = to_values(&Point { x: 1, y: -2 }).unwrap();
/// assert_eq!(values.get("y"), Some("-2"));
/// ```
///
/// # Errors
///
/// Returns [`Error::NotAStruct`] if `value` is not struct-shaped, and
/// [`Error::Namespaces`] (with the partial output) if some namespaces failed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_values<T>(value: &T) -> Result<Values>
where
    T: ?Sized + Serialize,
{
    Encoder::new().encode(value)
}

/// Encode any struct-shaped `T: Serialize` into an
/// `application/x-www-form-urlencoded` string.
///
/// # Examples
///
/// ```rust
/// use form_encoder::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Search { q: String, tags: Vec<String> }
///
/// let search = Search { q: "rust serde".to_string(), tags: vec!["a".into(), "b".into()] };
/// assert_eq!(to_string(&search).unwrap(), "q=rust+serde&tags=a&tags=b");
/// ```
///
/// # Errors
///
/// Same as [`to_values`]. Partial output is never rendered.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(to_values(value)?.to_query_string())
}

/// Convert any `T: Serialize` into a [`Value`] tree.
///
/// # Examples
///
/// ```rust
/// use form_encoder::{to_value, Value};
///
/// assert_eq!(to_value(&Some(5u8)).unwrap(), Value::Indirect(Box::new(Value::Uint(5))));
/// ```
///
/// # Errors
///
/// Returns an error if the value's `Serialize` implementation fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    ser::to_value(value)
}
