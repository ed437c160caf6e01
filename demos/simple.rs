//! Basic form encoding of a nested struct.
//!
//! Run with: cargo run --example simple

use form_encoder::{to_string, to_values};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;

#[derive(Debug, Serialize)]
struct Address {
    street: String,
    city: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Signup {
    name: String,
    email: String,
    tags: Vec<String>,
    address: Address,
    previous: Vec<Address>,
    meta: BTreeMap<String, i32>,
    #[serde(rename = "-")]
    password: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let signup = Signup {
        name: "Alice Johnson".to_string(),
        email: "alice@example.com".to_string(),
        tags: vec!["beta".to_string(), "newsletter".to_string()],
        address: Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
        },
        previous: vec![Address {
            street: "9 Elm Rd".to_string(),
            city: "Shelbyville".to_string(),
        }],
        meta: BTreeMap::from([("referrals".to_string(), 3)]),
        password: "hunter2".to_string(),
    };

    // Namespaced key/value pairs
    let values = to_values(&signup)?;
    for (key, list) in &values {
        println!("{} = {:?}", key, list);
    }

    // Ready to send as a request body
    let body = to_string(&signup)?;
    println!("\nForm body:\n{}", body);
    assert!(!body.contains("hunter2"));

    Ok(())
}
