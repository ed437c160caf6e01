//! Ordered multi-map holding encoded form output.
//!
//! [`Values`] wraps an [`IndexMap`] from namespace to the list of strings
//! encoded under it. A namespace can receive several values, for example the
//! elements of an unindexed `Vec<String>` field.
//!
//! ## Why IndexMap?
//!
//! - **Deterministic output**: namespaces keep the order they were first produced
//!   in, which follows struct declaration order
//! - **Value order**: values under one namespace keep traversal order
//!
//! ## Examples
//!
//! ```rust
//! use form_encoder::Values;
//!
//! let mut values = Values::new();
//! values.append("tags", "a");
//! values.append("tags", "b");
//! values.append("name", "x");
//!
//! assert_eq!(values.get("tags"), Some("a"));
//! assert_eq!(values.get_all("tags"), Some(&["a".to_string(), "b".to_string()][..]));
//! assert_eq!(values.to_query_string(), "tags=a&tags=b&name=x");
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

/// Namespace to encoded strings, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Values(IndexMap<String, Vec<String>>);

impl Values {
    #[must_use]
    pub fn new() -> Self {
        Values(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Values(IndexMap::with_capacity(capacity))
    }

    /// Appends a value under a namespace, creating the namespace if needed.
    pub fn append<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Appends every value under a namespace.
    ///
    /// The namespace is created even when `values` is empty.
    pub fn extend<K, I>(&mut self, key: K, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = String>,
    {
        self.0.entry(key.into()).or_default().extend(values);
    }

    /// Returns the first value for a namespace.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_encoder::Values;
    ///
    /// let mut values = Values::new();
    /// values.append("id", "1");
    /// values.append("id", "2");
    /// assert_eq!(values.get("id"), Some("1"));
    /// assert_eq!(values.get("missing"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.first().map(String::as_str)
    }

    /// Returns every value for a namespace.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Vec<String>> {
        self.0.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }

    /// Renders the values as an `application/x-www-form-urlencoded` string.
    ///
    /// Repeated values produce repeated `key=value` pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_encoder::Values;
    ///
    /// let mut values = Values::new();
    /// values.append("Meta[a b]", "1&2");
    /// assert_eq!(values.to_query_string(), "Meta%5Ba+b%5D=1%262");
    /// ```
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.0 {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl From<Values> for HashMap<String, Vec<String>> {
    fn from(values: Values) -> Self {
        values.0.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Values {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Values {
    type Item = (String, Vec<String>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Vec<String>)> for Values {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        let mut values = Values::new();
        for (key, list) in iter {
            values.extend(key, list);
        }
        values
    }
}
