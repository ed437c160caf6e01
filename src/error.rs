//! Error types for form encoding.
//!
//! Encoding fails in two very different ways:
//!
//! - **Precondition failures**: the top-level value is not struct-shaped
//!   ([`Error::NotAStruct`]). Nothing is produced.
//! - **Per-namespace failures**: an unsupported map key or a failing custom
//!   type function. Traversal skips the offending node and keeps going; every
//!   failure is collected into [`EncodeErrors`], which also carries the partial
//!   output, and returned as [`Error::Namespaces`].
//!
//! ## Examples
//!
//! ```rust
//! use form_encoder::{to_values, Error};
//! use serde::Serialize;
//! use std::collections::BTreeMap;
//!
//! #[derive(Serialize, PartialEq, Eq, PartialOrd, Ord)]
//! struct Point { x: i32 }
//!
//! #[derive(Serialize)]
//! struct Form {
//!     name: String,
//!     points: BTreeMap<Point, i32>,
//! }
//!
//! let mut points = BTreeMap::new();
//! points.insert(Point { x: 1 }, 1);
//!
//! let form = Form { name: "x".to_string(), points };
//! match to_values(&form) {
//!     Err(Error::Namespaces(errors)) => {
//!         assert!(errors.get("points").is_some());
//!         assert_eq!(errors.values().get("name"), Some("x"));
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use crate::{Kind, Value, Values};
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

const FIELD_NS: &str = "Field Namespace:";
const ERROR_TEXT: &str = " ERROR:";

/// Represents all possible errors that can occur during form encoding.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The top-level value does not resolve to a struct
    #[error("cannot encode a top-level {kind}: expected a struct, a reference to a struct or an Option containing one")]
    NotAStruct { kind: Kind },

    /// One or more namespaces failed, partial output attached
    #[error("{0}")]
    Namespaces(EncodeErrors),

    /// Map key of a kind that has no string form
    #[error("Unsupported Map Key '{key}' Namespace '{namespace}'")]
    UnsupportedMapKey { key: String, namespace: String },

    /// A custom type function returned nothing for a map key
    #[error("custom type function returned no value for a map key at namespace '{namespace}'")]
    EmptyCustomValue { namespace: String },

    /// A date/time value that is not valid RFC 3339
    #[error("invalid date/time '{0}'")]
    InvalidDateTime(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a custom error with a display message.
    ///
    /// Custom type functions use this to report failures.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_encoder::Error;
    ///
    /// let err = Error::custom("value out of range");
    /// assert_eq!(err.to_string(), "value out of range");
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn not_a_struct(kind: Kind) -> Self {
        Error::NotAStruct { kind }
    }

    pub fn unsupported_map_key(key: &Value, namespace: &str) -> Self {
        Error::UnsupportedMapKey {
            key: key.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// Returns the per-namespace errors if this is an aggregate error.
    #[must_use]
    pub fn as_namespaces(&self) -> Option<&EncodeErrors> {
        match self {
            Error::Namespaces(errors) => Some(errors),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Every namespace that failed during one encode, plus the output produced
/// for everything else.
///
/// A namespace holds at most one error; a later failure at the same namespace
/// replaces the earlier one.
#[derive(Debug, Clone)]
pub struct EncodeErrors {
    errors: IndexMap<String, Error>,
    values: Values,
}

impl EncodeErrors {
    pub(crate) fn new(errors: IndexMap<String, Error>, values: Values) -> Self {
        EncodeErrors { errors, values }
    }

    /// Returns the error recorded for a namespace.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&Error> {
        self.errors.get(namespace)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over `(namespace, error)` pairs in the order they were first recorded.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Error> {
        self.errors.iter()
    }

    /// The output produced for the namespaces that did not fail.
    #[must_use]
    pub fn values(&self) -> &Values {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Values {
        self.values
    }
}

impl fmt::Display for EncodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (namespace, err)) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}{}{}{}", FIELD_NS, namespace, ERROR_TEXT, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for EncodeErrors {}

/// Collects per-namespace errors during a single encode.
#[derive(Debug, Default)]
pub(crate) struct ErrorAccumulator {
    errors: IndexMap<String, Error>,
}

impl ErrorAccumulator {
    pub(crate) fn record(&mut self, namespace: String, err: Error) {
        tracing::debug!(namespace = %namespace, error = %err, "form namespace failed");
        self.errors.insert(namespace, err);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Hands back the output alone when nothing failed.
    pub(crate) fn finish(self, values: Values) -> Result<Values> {
        if self.is_empty() {
            Ok(values)
        } else {
            Err(Error::Namespaces(EncodeErrors::new(self.errors, values)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_error_replaces_earlier() {
        let mut acc = ErrorAccumulator::default();
        assert!(acc.is_empty());

        acc.record("a".to_string(), Error::custom("first"));
        acc.record("b".to_string(), Error::custom("other"));
        acc.record("a".to_string(), Error::custom("second"));

        let err = acc.finish(Values::new()).unwrap_err();
        let errors = err.as_namespaces().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("a").unwrap().to_string(), "second");

        let namespaces: Vec<_> = errors.iter().map(|(ns, _)| ns.as_str()).collect();
        assert_eq!(namespaces, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_accumulator_returns_values() {
        let mut values = Values::new();
        values.append("k", "v");
        let values = ErrorAccumulator::default().finish(values).unwrap();
        assert_eq!(values.get("k"), Some("v"));
    }

    #[test]
    fn test_display_lists_every_namespace() {
        let mut errors = IndexMap::new();
        errors.insert("Meta".to_string(), Error::custom("bad key"));
        errors.insert("When".to_string(), Error::custom("bad time"));
        let err = EncodeErrors::new(errors, Values::new());

        assert_eq!(
            err.to_string(),
            "Field Namespace:Meta ERROR:bad key\nField Namespace:When ERROR:bad time"
        );
    }

    #[test]
    fn test_unsupported_map_key_message() {
        let key = Value::Struct {
            name: Some("Point"),
            fields: vec![],
        };
        let err = Error::unsupported_map_key(&key, "Points");
        assert_eq!(
            err.to_string(),
            "Unsupported Map Key '<Point Value>' Namespace 'Points'"
        );
    }
}
