//! Property-based tests for scalar formatting and namespace layout.
//!
//! Each scalar is wrapped in a one-field struct, encoded, and parsed back with
//! the type's inverse parse.

use form_encoder::{to_values, Encoder};
use proptest::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::str::FromStr;

#[derive(Serialize)]
struct Holder<T> {
    v: T,
}

fn roundtrip<T>(value: T) -> bool
where
    T: Serialize + FromStr + PartialEq + Debug,
{
    let values = match to_values(&Holder { v: &value }) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Encode failed: {}", e);
            return false;
        }
    };
    match values.get("v").map(str::parse::<T>) {
        Some(Ok(parsed)) => parsed == value,
        _ => {
            eprintln!("Parse failed for {:?}: {:?}", value, values.get("v"));
            false
        }
    }
}

proptest! {
    #[test]
    fn prop_i8(n in any::<i8>()) {
        prop_assert!(roundtrip(n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(n));
    }

    #[test]
    fn prop_i128(n in any::<i128>()) {
        prop_assert!(roundtrip(n));
    }

    #[test]
    fn prop_u32(n in any::<u32>()) {
        prop_assert!(roundtrip(n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(b));
    }

    #[test]
    fn prop_char(c in any::<char>()) {
        prop_assert!(roundtrip(c));
    }

    #[test]
    fn prop_string(s in ".*") {
        prop_assert!(roundtrip(s));
    }

    #[test]
    fn prop_finite_f64(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        prop_assert!(roundtrip(f));
    }

    #[test]
    fn prop_finite_f32(f in any::<f32>().prop_filter("finite", |f| f.is_finite())) {
        prop_assert!(roundtrip(f));
    }

    #[test]
    fn prop_floats_never_use_exponents(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let values = to_values(&Holder { v: f }).unwrap();
        let text = values.get("v").unwrap();
        prop_assert!(!text.contains('e') && !text.contains('E'));
    }

    #[test]
    fn prop_unindexed_vec_repeats_every_value(v in prop::collection::vec(any::<i32>(), 1..20)) {
        let values = to_values(&Holder { v: v.clone() }).unwrap();
        let expected: Vec<String> = v.iter().map(i32::to_string).collect();
        prop_assert_eq!(values.get_all("v").unwrap(), expected.as_slice());
        prop_assert_eq!(values.len(), 1);
    }

    #[test]
    fn prop_nested_vec_is_fully_indexed(v in prop::collection::vec(any::<u16>(), 1..10)) {
        let values = to_values(&Holder { v: vec![Holder { v: v.clone() }] }).unwrap();
        prop_assert_eq!(values.len(), v.len());
        for (i, n) in v.iter().enumerate() {
            let key = format!("v[0].v[{}]", i);
            let expected = n.to_string();
            prop_assert_eq!(values.get(&key), Some(expected.as_str()));
        }
    }

    #[test]
    fn prop_map_entries_become_bracketed_keys(m in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..10)) {
        let values = to_values(&Holder { v: &m }).unwrap();
        prop_assert_eq!(values.len(), m.len());
        for (k, n) in &m {
            let key = format!("v[{}]", k);
            let expected = n.to_string();
            prop_assert_eq!(values.get(&key), Some(expected.as_str()));
        }
    }

    #[test]
    fn prop_encoding_is_deterministic(
        a in any::<i32>(),
        s in "[a-zA-Z0-9 ]{0,16}",
        m in prop::collection::btree_map("[a-z]{1,4}", any::<u8>(), 0..5),
    ) {
        #[derive(Serialize, Clone)]
        struct Record {
            a: i32,
            s: String,
            m: BTreeMap<String, u8>,
        }

        let encoder = Encoder::new();
        let record = Record { a, s, m };
        let first = encoder.encode(&record).unwrap();
        let second = encoder.encode(&record.clone()).unwrap();
        prop_assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
        prop_assert_eq!(encoder.cached_struct_count(), 1);
    }
}
