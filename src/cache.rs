//! Struct field descriptors and their shared cache.
//!
//! A [`StructDescriptor`] lists the fields of a struct that take part in
//! encoding, each with the key it is encoded under. Descriptors for named
//! structs are computed once per encoder and kept in a [`StructCache`];
//! anonymous structs (enum variants, hand-written impls without a name) are
//! resolved on every visit.

use crate::value::Field;
use dashmap::DashMap;
use std::borrow::Cow;
use std::sync::Arc;

/// An encodable field: its position among the struct's serialized fields and
/// the key it is encoded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedField {
    pub index: usize,
    pub name: Cow<'static, str>,
}

/// The encodable fields of one struct type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
    source: Vec<Cow<'static, str>>,
    fields: Vec<CachedField>,
}

impl StructDescriptor {
    /// Resolves which fields are encoded.
    ///
    /// A field is left out when its key equals `skip_marker` or is empty.
    /// Fields removed with `#[serde(skip)]` never reach the encoder at all.
    pub fn resolve(fields: &[Field], skip_marker: &str) -> Self {
        let source = fields.iter().map(|field| field.key.clone()).collect();
        let fields = fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.key.is_empty() && field.key != skip_marker)
            .map(|(index, field)| CachedField {
                index,
                name: field.key.clone(),
            })
            .collect();
        StructDescriptor { source, fields }
    }

    #[must_use]
    pub fn fields(&self) -> &[CachedField] {
        &self.fields
    }

    /// Whether this descriptor was built from a struct with the same field keys.
    ///
    /// Two distinct types can share a serde name; their descriptors must not
    /// be mixed up.
    #[must_use]
    pub fn matches(&self, fields: &[Field]) -> bool {
        self.source.len() == fields.len()
            && self
                .source
                .iter()
                .zip(fields)
                .all(|(key, field)| *key == field.key)
    }
}

/// Concurrent map from struct name to descriptor.
///
/// Cloning the cache shares the underlying map. Concurrent first-time
/// computation for the same name is harmless: descriptors are deterministic
/// and the last write wins.
#[derive(Debug, Clone, Default)]
pub struct StructCache {
    map: Arc<DashMap<&'static str, Arc<StructDescriptor>>>,
}

impl StructCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<StructDescriptor>> {
        self.map.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn set(&self, name: &'static str, descriptor: Arc<StructDescriptor>) {
        self.map.insert(name, descriptor);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use std::thread;

    fn fields(keys: &[&'static str]) -> Vec<Field> {
        keys.iter().map(|key| Field::new(*key, Value::Absent)).collect()
    }

    #[test]
    fn test_resolve_excludes_skip_marker_and_empty_keys() {
        let descriptor = StructDescriptor::resolve(&fields(&["a", "-", "", "d"]), "-");
        assert_eq!(
            descriptor.fields(),
            &[
                CachedField {
                    index: 0,
                    name: "a".into()
                },
                CachedField {
                    index: 3,
                    name: "d".into()
                },
            ]
        );
    }

    #[test]
    fn test_matches_detects_a_different_shape() {
        let descriptor = StructDescriptor::resolve(&fields(&["a", "b"]), "-");
        assert!(descriptor.matches(&fields(&["a", "b"])));
        assert!(!descriptor.matches(&fields(&["a"])));
        assert!(!descriptor.matches(&fields(&["a", "c"])));
    }

    #[test]
    fn test_concurrent_writers_for_one_name() {
        let cache = StructCache::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let descriptor = StructDescriptor::resolve(&fields(&["x", "y"]), "-");
                    cache.set("Point", Arc::new(descriptor));
                    cache.get("Point").unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().fields().len(), 2);
        }
        assert_eq!(cache.len(), 1);
    }
}
