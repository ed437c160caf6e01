//! The form encoder and its traversal.
//!
//! [`Encoder`] walks a value's [`Value`] tree and writes one entry per leaf
//! into [`Values`]. Keys are namespaces built along the path to the leaf:
//!
//! - struct fields are joined with the separator: `Parent.Child`
//! - sequence elements get `[i]`: `Items[2].Name`
//! - map entries get `[key]`: `Meta[color]`
//!
//! A sequence of scalars that is not itself inside an indexed context is
//! encoded without indices, as repeated values under one key. This is the
//! usual `tags=a&tags=b` form layout.
//!
//! ## Examples
//!
//! ```rust
//! use form_encoder::Encoder;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Item { name: String, sizes: Vec<u8> }
//!
//! #[derive(Serialize)]
//! struct Cart { owner: String, tags: Vec<String>, items: Vec<Item> }
//!
//! let cart = Cart {
//!     owner: "ann".to_string(),
//!     tags: vec!["a".to_string(), "b".to_string()],
//!     items: vec![Item { name: "hat".to_string(), sizes: vec![1, 2] }],
//! };
//!
//! let values = Encoder::new().encode(&cart).unwrap();
//! assert_eq!(values.get_all("tags").unwrap(), &["a", "b"]);
//! assert_eq!(values.get("items[0].name"), Some("hat"));
//! assert_eq!(values.get("items[0].sizes[1]"), Some("2"));
//! ```

use crate::cache::{StructCache, StructDescriptor};
use crate::custom::CustomTypeRegistry;
use crate::error::ErrorAccumulator;
use crate::ser::to_value;
use crate::value::{format_datetime, Field};
use crate::{EncoderOptions, Error, Result, TypeKey, Value, Values};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;

/// Encodes Rust values into form key/value pairs.
///
/// An encoder owns its options, its custom type functions and a cache of
/// struct descriptors. Register custom functions first, then share the encoder
/// freely: [`encode`](Encoder::encode) takes `&self` and may run concurrently
/// from several threads.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncoderOptions,
    cache: StructCache,
    custom: CustomTypeRegistry,
}

impl Encoder {
    /// Creates an encoder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder with the given options and an empty cache.
    #[must_use]
    pub fn with_options(options: EncoderOptions) -> Self {
        Encoder {
            options,
            ..Default::default()
        }
    }

    /// Returns the options this encoder was built with.
    #[must_use]
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Registers `func` as the encoder for each of `types`.
    ///
    /// A registered function takes precedence over the built-in handling,
    /// including structs and [`TypeKey::DateTime`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::{DateTime, TimeZone, Utc};
    /// use form_encoder::{Encoder, TypeKey};
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Event {
    ///     #[serde(with = "form_encoder::datetime")]
    ///     at: DateTime<Utc>,
    /// }
    ///
    /// let mut encoder = Encoder::new();
    /// encoder.register_custom_type_func(
    ///     |value| Ok(vec![value.as_datetime().unwrap().format("%Y-%m-%d").to_string()]),
    ///     [TypeKey::DateTime],
    /// );
    ///
    /// let event = Event { at: Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap() };
    /// let values = encoder.encode(&event).unwrap();
    /// assert_eq!(values.get("at"), Some("2024-03-09"));
    /// ```
    pub fn register_custom_type_func<F, I>(&mut self, func: F, types: I)
    where
        F: Fn(&Value) -> Result<Vec<String>> + Send + Sync + 'static,
        I: IntoIterator<Item = TypeKey>,
    {
        self.custom.register(func, types);
    }

    /// Number of struct types whose descriptors are cached.
    #[must_use]
    pub fn cached_struct_count(&self) -> usize {
        self.cache.len()
    }

    /// Encodes a struct, a reference to one or an `Option` holding one.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAStruct`] if the value is not struct-shaped; nothing is encoded.
    /// - [`Error::Namespaces`] if some namespaces failed. The error carries
    ///   the failures and the values encoded for every other namespace.
    /// - Any error raised by the value's own `Serialize` implementation.
    pub fn encode<T>(&self, value: &T) -> Result<Values>
    where
        T: ?Sized + Serialize,
    {
        let root = to_value(value)?;
        let (name, fields) = top_level_struct(&root)?;

        let mut state = EncodeState {
            encoder: self,
            values: Values::new(),
            errors: ErrorAccumulator::default(),
        };
        state.visit_struct(name, fields, "", Index::Unindexed);
        state.errors.finish(state.values)
    }

    fn descriptor(&self, name: &'static str, fields: &[Field]) -> Arc<StructDescriptor> {
        if let Some(descriptor) = self.cache.get(name) {
            if descriptor.matches(fields) {
                return descriptor;
            }
        }
        tracing::trace!(struct_name = name, "resolving struct descriptor");
        let descriptor = Arc::new(StructDescriptor::resolve(fields, &self.options.skip_marker));
        self.cache.set(name, Arc::clone(&descriptor));
        descriptor
    }
}

fn top_level_struct(root: &Value) -> Result<(Option<&'static str>, &[Field])> {
    let mut current = root.resolve().0;
    while let Value::Newtype { value, .. } = current {
        current = value.resolve().0;
    }
    match current {
        Value::Struct { name, fields } => Ok((*name, fields)),
        other => Err(Error::not_a_struct(other.kind())),
    }
}

/// Whether the namespace of the node being visited still owes an index suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Index {
    /// Not inside any indexed context.
    Unindexed,
    /// Element `i` of an unindexed sequence; the suffix is added only if the
    /// element turns out not to be a plain scalar.
    Pending(usize),
    /// The namespace already carries every index it needs.
    Resolved,
}

impl Index {
    /// Appends a pending suffix to `namespace`.
    fn settle(self, namespace: &mut String) -> Index {
        match self {
            Index::Pending(i) => {
                push_index(namespace, i);
                Index::Resolved
            }
            other => other,
        }
    }
}

fn push_index(namespace: &mut String, i: usize) {
    let _ = write!(namespace, "[{}]", i);
}

/// Output and errors of a single encode call.
struct EncodeState<'e> {
    encoder: &'e Encoder,
    values: Values,
    errors: ErrorAccumulator,
}

impl EncodeState<'_> {
    fn visit(&mut self, value: &Value, mut namespace: String, mut index: Index) {
        let (value, indirect) = value.resolve();
        if indirect {
            index = index.settle(&mut namespace);
        }
        if value.is_absent() {
            return;
        }

        if let Some(func) = self.encoder.custom.for_value(value) {
            match func(value) {
                Ok(strings) => {
                    index.settle(&mut namespace);
                    self.values.extend(namespace, strings);
                }
                Err(err) => self.errors.record(namespace, err),
            }
            return;
        }

        match value {
            Value::Absent | Value::Indirect(_) => {}
            Value::Newtype { value: inner, .. } => self.visit(inner, namespace, index),
            Value::DateTime(dt) => {
                index.settle(&mut namespace);
                self.values.append(namespace, format_datetime(dt));
            }
            Value::Seq(items) => self.visit_seq(items, namespace, index),
            Value::Map(entries) => self.visit_map(entries, namespace, index),
            Value::Struct { name, fields } => {
                let index = index.settle(&mut namespace);
                self.visit_struct(*name, fields, &namespace, index);
            }
            scalar => {
                if let Some(s) = scalar.to_scalar_string() {
                    self.values.append(namespace, s);
                }
            }
        }
    }

    fn visit_struct(
        &mut self,
        name: Option<&'static str>,
        fields: &[Field],
        namespace: &str,
        index: Index,
    ) {
        let encoder = self.encoder;
        let descriptor = match name {
            Some(name) => encoder.descriptor(name, fields),
            None => Arc::new(StructDescriptor::resolve(
                fields,
                &encoder.options.skip_marker,
            )),
        };

        for cached in descriptor.fields() {
            let Some(field) = fields.get(cached.index) else {
                continue;
            };
            let child = if namespace.is_empty() {
                cached.name.to_string()
            } else {
                let mut child = String::with_capacity(namespace.len() + cached.name.len() + 1);
                child.push_str(namespace);
                child.push(encoder.options.separator);
                child.push_str(&cached.name);
                child
            };
            self.visit(&field.value, child, index);
        }
    }

    fn visit_seq(&mut self, items: &[Value], mut namespace: String, index: Index) {
        if index == Index::Unindexed {
            for (i, item) in items.iter().enumerate() {
                self.visit(item, namespace.clone(), Index::Pending(i));
            }
            return;
        }

        index.settle(&mut namespace);
        for (i, item) in items.iter().enumerate() {
            let mut child = namespace.clone();
            push_index(&mut child, i);
            self.visit(item, child, Index::Resolved);
        }
    }

    fn visit_map(&mut self, entries: &[(Value, Value)], mut namespace: String, index: Index) {
        index.settle(&mut namespace);

        let mut keyed: Vec<(String, &Value)> = entries
            .iter()
            .filter_map(|(key, value)| Some((self.map_key(key, &namespace)?, value)))
            .collect();
        if self.encoder.options.sort_map_keys {
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
        }

        for (key, value) in keyed {
            let child = format!("{}[{}]", namespace, key);
            self.visit(value, child, Index::Resolved);
        }
    }

    /// String form of a map key, or `None` if the entry must be skipped.
    fn map_key(&mut self, key: &Value, namespace: &str) -> Option<String> {
        let key = key.resolve().0;

        if let Some(func) = self.encoder.custom.for_value(key) {
            return match func(key) {
                Ok(strings) => match strings.into_iter().next() {
                    Some(first) => Some(first),
                    None => {
                        let err = Error::EmptyCustomValue {
                            namespace: namespace.to_string(),
                        };
                        self.errors.record(namespace.to_string(), err);
                        None
                    }
                },
                Err(err) => {
                    self.errors.record(namespace.to_string(), err);
                    None
                }
            };
        }

        match key {
            Value::Absent => None,
            Value::Newtype { value, .. } => self.map_key(value, namespace),
            other => {
                let s = other.to_scalar_string();
                if s.is_none() {
                    let err = Error::unsupported_map_key(other, namespace);
                    self.errors.record(namespace.to_string(), err);
                }
                s
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Inner {
        nums: Vec<u8>,
    }

    #[derive(Serialize)]
    struct Outer {
        outer: Vec<Inner>,
    }

    #[derive(Serialize)]
    struct Pointers {
        items: Vec<Option<u8>>,
        nested: Vec<Vec<u8>>,
    }

    #[test]
    fn test_index_settle() {
        let mut ns = String::from("a");
        assert_eq!(Index::Pending(3).settle(&mut ns), Index::Resolved);
        assert_eq!(ns, "a[3]");
        assert_eq!(Index::Resolved.settle(&mut ns), Index::Resolved);
        assert_eq!(Index::Unindexed.settle(&mut ns), Index::Unindexed);
        assert_eq!(ns, "a[3]");
    }

    #[test]
    fn test_indexed_context_indexes_nested_scalars() {
        let value = Outer {
            outer: vec![Inner { nums: vec![1, 2, 3] }],
        };
        let values = Encoder::new().encode(&value).unwrap();
        assert_eq!(values.get("outer[0].nums[0]"), Some("1"));
        assert_eq!(values.get("outer[0].nums[1]"), Some("2"));
        assert_eq!(values.get("outer[0].nums[2]"), Some("3"));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_optional_elements_are_indexed_once() {
        let value = Pointers {
            items: vec![Some(1), None, Some(3)],
            nested: vec![vec![4], vec![5, 6]],
        };
        let values = Encoder::new().encode(&value).unwrap();
        assert_eq!(values.get("items[0]"), Some("1"));
        assert!(!values.contains_key("items[1]"));
        assert_eq!(values.get("items[2]"), Some("3"));
        assert_eq!(values.get("nested[0][0]"), Some("4"));
        assert_eq!(values.get("nested[1][1]"), Some("6"));
        assert!(!values.contains_key("items"));
    }

    #[test]
    fn test_descriptor_is_cached_per_named_struct() {
        let encoder = Encoder::new();
        let value = Outer {
            outer: vec![Inner { nums: vec![] }, Inner { nums: vec![1] }],
        };
        encoder.encode(&value).unwrap();
        assert_eq!(encoder.cached_struct_count(), 2);
        encoder.encode(&value).unwrap();
        assert_eq!(encoder.cached_struct_count(), 2);
    }

    #[test]
    fn test_same_name_different_shape() {
        mod a {
            #[derive(serde::Serialize)]
            pub struct Config {
                pub x: u8,
            }
        }
        mod b {
            #[derive(serde::Serialize)]
            pub struct Config {
                pub y: u8,
                pub z: u8,
            }
        }

        let encoder = Encoder::new();
        let first = encoder.encode(&a::Config { x: 1 }).unwrap();
        let second = encoder.encode(&b::Config { y: 2, z: 3 }).unwrap();
        assert_eq!(first.get("x"), Some("1"));
        assert_eq!(second.get("y"), Some("2"));
        assert_eq!(second.get("z"), Some("3"));
    }

    #[test]
    fn test_sorted_map_keys() {
        #[derive(Serialize)]
        struct Form {
            scores: std::collections::HashMap<String, u8>,
        }

        let scores = [("c", 3), ("a", 1), ("b", 2)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let form = Form { scores };

        let encoder = Encoder::with_options(EncoderOptions::new().with_sorted_map_keys(true));
        let values = encoder.encode(&form).unwrap();
        let keys: Vec<_> = values.keys().cloned().collect();
        assert_eq!(keys, vec!["scores[a]", "scores[b]", "scores[c]"]);
    }

    #[test]
    fn test_map_key_custom_function_uses_first_string() {
        #[derive(Serialize, PartialEq, Eq, PartialOrd, Ord)]
        struct Code(u8);

        #[derive(Serialize)]
        struct Form {
            m: BTreeMap<Code, u8>,
        }

        let mut encoder = Encoder::new();
        encoder.register_custom_type_func(
            |v| {
                let n = v.as_u64().unwrap_or_default();
                Ok(vec![format!("c{}", n), "ignored".to_string()])
            },
            [TypeKey::from("Code")],
        );

        let mut m = BTreeMap::new();
        m.insert(Code(7), 1);
        let values = encoder.encode(&Form { m }).unwrap();
        assert_eq!(values.get("m[c7]"), Some("1"));
    }

    #[test]
    fn test_map_key_custom_function_returning_nothing() {
        #[derive(Serialize, PartialEq, Eq, PartialOrd, Ord)]
        struct Code(u8);

        #[derive(Serialize)]
        struct Form {
            m: BTreeMap<Code, u8>,
        }

        let mut encoder = Encoder::new();
        encoder.register_custom_type_func(|_| Ok(vec![]), [TypeKey::from("Code")]);

        let mut m = BTreeMap::new();
        m.insert(Code(7), 1);
        let err = encoder.encode(&Form { m }).unwrap_err();
        let errors = err.as_namespaces().unwrap();
        assert!(matches!(errors.get("m"), Some(Error::EmptyCustomValue { .. })));
        assert!(errors.values().is_empty());
    }

    #[test]
    fn test_custom_function_result_gets_pending_index() {
        #[derive(Serialize)]
        struct Money(i64);

        #[derive(Serialize)]
        struct Form {
            prices: Vec<Money>,
        }

        let mut encoder = Encoder::new();
        encoder.register_custom_type_func(
            |v| Ok(vec![format!("${}", v.as_i64().unwrap_or_default())]),
            [TypeKey::from("Money")],
        );

        let values = encoder
            .encode(&Form {
                prices: vec![Money(1), Money(2)],
            })
            .unwrap();
        assert_eq!(values.get("prices[0]"), Some("$1"));
        assert_eq!(values.get("prices[1]"), Some("$2"));
    }

    #[test]
    fn test_newtypes_without_custom_function_are_transparent() {
        #[derive(Serialize)]
        struct UserId(u32);

        #[derive(Serialize)]
        struct Form {
            ids: Vec<UserId>,
        }

        let values = Encoder::new()
            .encode(&Form {
                ids: vec![UserId(1), UserId(2)],
            })
            .unwrap();
        assert_eq!(values.get_all("ids").unwrap(), &["1", "2"]);
    }

    #[test]
    fn test_top_level_shapes() {
        #[derive(Serialize)]
        struct Wrapper(Inner);

        let inner = Inner { nums: vec![1] };
        let values = Encoder::new().encode(&Some(&inner)).unwrap();
        assert_eq!(values.get("nums"), Some("1"));

        let values = Encoder::new().encode(&Wrapper(Inner { nums: vec![2] })).unwrap();
        assert_eq!(values.get("nums"), Some("2"));

        let err = Encoder::new().encode(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, Error::NotAStruct { kind: crate::Kind::Seq }));

        let err = Encoder::new().encode(&None::<Inner>).unwrap_err();
        assert!(matches!(err, Error::NotAStruct { kind: crate::Kind::Absent }));
    }
}
