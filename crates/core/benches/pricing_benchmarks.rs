use chrono::{DateTime, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use procat_core::{Discount, Money};

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn bench_money_arithmetic(c: &mut Criterion) {
    let a = Money::of(19_999, 100).unwrap();
    let b = Money::of(1, 3).unwrap();

    c.bench_function("money_add", |bench| {
        bench.iter(|| black_box(&a).add(black_box(&b)))
    });

    c.bench_function("money_mul", |bench| {
        bench.iter(|| black_box(&a).mul(black_box(&b)))
    });

    c.bench_function("money_storage_parts", |bench| {
        bench.iter(|| black_box(&a).storage_parts().unwrap())
    });
}

fn bench_discount_pricing(c: &mut Criterion) {
    let discount = Discount::new(
        Decimal::new(175, 1),
        ts("2025-01-01T00:00:00Z"),
        ts("2025-12-31T23:59:59Z"),
    )
    .unwrap();
    let price = Money::of(123_456, 100).unwrap();

    // The multiplier is cached at construction; this measures the per-call
    // cost of applying it.
    c.bench_function("discount_apply", |bench| {
        bench.iter(|| black_box(&discount).apply(black_box(&price)))
    });

    c.bench_function("discount_validity_check", |bench| {
        let t = ts("2025-06-15T12:00:00Z");
        bench.iter(|| black_box(&discount).is_valid_at(black_box(t)))
    });
}

criterion_group!(benches, bench_money_arithmetic, bench_discount_pricing);
criterion_main!(benches);
