//! Custom type functions, date/time fields and error reporting.
//!
//! Run with: cargo run --example custom_types

use chrono::{DateTime, TimeZone, Utc};
use form_encoder::{Encoder, EncoderOptions, Error, TypeKey};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
struct Cents(i64);

#[derive(Debug, Serialize, PartialEq, Eq, Hash)]
struct Sku(u32);

#[derive(Debug, Serialize)]
struct Order {
    #[serde(with = "form_encoder::datetime")]
    placed: DateTime<Utc>,
    #[serde(with = "form_encoder::datetime::option")]
    shipped: Option<DateTime<Utc>>,
    total: Cents,
    quantities: HashMap<Sku, u32>,
}

fn main() {
    let mut encoder = Encoder::with_options(EncoderOptions::new().with_sorted_map_keys(true));

    // Money as a decimal string
    encoder.register_custom_type_func(
        |value| {
            let cents = value
                .as_i64()
                .ok_or_else(|| Error::custom("expected an amount in cents"))?;
            Ok(vec![format!("{}.{:02}", cents / 100, cents % 100)])
        },
        [TypeKey::from("Cents")],
    );

    // SKUs as map keys; zero is not a valid SKU
    encoder.register_custom_type_func(
        |value| match value.as_u64() {
            Some(0) | None => Err(Error::custom("invalid SKU")),
            Some(n) => Ok(vec![format!("SKU-{:05}", n)]),
        },
        [TypeKey::from("Sku")],
    );

    // Dates only, no time of day
    encoder.register_custom_type_func(
        |value| {
            let dt = value
                .as_datetime()
                .ok_or_else(|| Error::custom("expected a date/time"))?;
            Ok(vec![dt.format("%Y-%m-%d").to_string()])
        },
        [TypeKey::DateTime],
    );

    let order = Order {
        placed: Utc.with_ymd_and_hms(2024, 3, 9, 10, 30, 0).unwrap(),
        shipped: None,
        total: Cents(4999),
        quantities: HashMap::from([(Sku(12), 2), (Sku(7), 1), (Sku(0), 5)]),
    };

    match encoder.encode(&order) {
        Ok(values) => println!("{}", values.to_query_string()),
        Err(Error::Namespaces(errors)) => {
            println!("Some fields failed:\n{}\n", errors);
            println!("Encoded anyway:\n{}", errors.values().to_query_string());
        }
        Err(err) => eprintln!("encoding failed: {}", err),
    }
}
