use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use form_encoder::{to_string, Encoder, TypeKey};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
    tags: Vec<String>,
}

#[derive(Serialize, Clone)]
struct Cart {
    owner: User,
    items: Vec<Product>,
    attributes: BTreeMap<String, String>,
}

#[derive(Serialize, Clone)]
struct Cents(i64);

#[derive(Serialize, Clone)]
struct Invoice {
    number: u32,
    lines: Vec<Cents>,
}

fn sample_user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn sample_cart(size: u32) -> Cart {
    Cart {
        owner: sample_user(),
        items: (0..size)
            .map(|i| Product {
                sku: format!("SKU{}", i),
                name: format!("Product {}", i),
                price: 9.99 + f64::from(i),
                quantity: i,
                tags: vec!["new".to_string(), "sale".to_string()],
            })
            .collect(),
        attributes: (0..8)
            .map(|i| (format!("attr{}", i), format!("value {}", i)))
            .collect(),
    }
}

fn benchmark_encode_simple(c: &mut Criterion) {
    let user = sample_user();
    let encoder = Encoder::new();

    c.bench_function("encode_simple_struct", |b| {
        b.iter(|| encoder.encode(black_box(&user)))
    });
}

fn benchmark_encode_cart(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_cart");
    let encoder = Encoder::new();

    for size in [10, 50, 100, 500].iter() {
        let cart = sample_cart(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &cart, |b, cart| {
            b.iter(|| encoder.encode(black_box(cart)))
        });
    }
    group.finish();
}

fn benchmark_cold_vs_warm_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptor_cache");
    let cart = sample_cart(50);

    group.bench_function("fresh_encoder", |b| {
        b.iter(|| Encoder::new().encode(black_box(&cart)))
    });

    let encoder = Encoder::new();
    group.bench_function("shared_encoder", |b| {
        b.iter(|| encoder.encode(black_box(&cart)))
    });
    group.finish();
}

fn benchmark_custom_type_func(c: &mut Criterion) {
    let invoice = Invoice {
        number: 7,
        lines: (0..100).map(Cents).collect(),
    };

    let mut encoder = Encoder::new();
    encoder.register_custom_type_func(
        |value| {
            let cents = value.as_i64().unwrap_or_default();
            Ok(vec![format!("{}.{:02}", cents / 100, cents % 100)])
        },
        [TypeKey::from("Cents")],
    );

    c.bench_function("encode_custom_type_func", |b| {
        b.iter(|| encoder.encode(black_box(&invoice)))
    });
}

fn benchmark_query_string(c: &mut Criterion) {
    let cart = sample_cart(50);

    c.bench_function("to_query_string", |b| b.iter(|| to_string(black_box(&cart))));
}

criterion_group!(
    benches,
    benchmark_encode_simple,
    benchmark_encode_cart,
    benchmark_cold_vs_warm_cache,
    benchmark_custom_type_func,
    benchmark_query_string
);
criterion_main!(benches);
