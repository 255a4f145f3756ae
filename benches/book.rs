//! Criterion benchmarks for the matching core.
//!
//! Measures:
//! - Add order (no match)
//! - Add order crossing a pre-built ladder
//! - Cancel order
//! - Mixed workload

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbook::{Book, Order, OrderType, Side};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn random_order(rng: &mut ChaCha8Rng, id: u64) -> Order {
    Order::limit(
        OrderType::GoodTillCancel,
        id,
        if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
        rng.gen_range(9900..10100),
        rng.gen_range(1..1000),
    )
}

/// Add an order that rests (no matching)
fn bench_add_no_match(c: &mut Criterion) {
    let mut book = Book::with_capacity(1 << 20);
    let mut order_id = 0u64;

    c.bench_function("add_no_match", |b| {
        b.iter(|| {
            order_id += 1;
            // Below any ask, above no bid ladder: always rests.
            let order = Order::limit(OrderType::GoodTillCancel, order_id, Side::Buy, 9000, 100);
            black_box(book.add_order(order))
        })
    });
}

/// Add an order that sweeps a ladder of resting asks
fn bench_add_full_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_full_match");

    for depth in [1u64, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut order_id = 1_000_000u64;
            b.iter_batched(
                || {
                    let mut book = Book::with_capacity(1024);
                    for i in 0..depth {
                        book.add_order(Order::limit(
                            OrderType::GoodTillCancel,
                            i + 1,
                            Side::Sell,
                            10_000 + i as i32,
                            100,
                        ));
                    }
                    book
                },
                |mut book| {
                    order_id += 1;
                    let order = Order::limit(
                        OrderType::GoodTillCancel,
                        order_id,
                        Side::Buy,
                        10_000 + depth as i32,
                        100 * depth as u32,
                    );
                    black_box(book.add_order(order))
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

/// Cancel a resting order
fn bench_cancel(c: &mut Criterion) {
    c.bench_function("cancel", |b| {
        let mut order_id = 0u64;
        b.iter_batched(
            || {
                order_id += 1;
                let mut book = Book::with_capacity(16);
                book.add_order(Order::limit(
                    OrderType::GoodTillCancel,
                    order_id,
                    Side::Buy,
                    10_000,
                    100,
                ));
                (book, order_id)
            },
            |(mut book, id)| {
                book.cancel_order(id);
                black_box(book.size())
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

/// Random add/cancel mix around a tight spread
fn bench_mixed_workload(c: &mut Criterion) {
    c.bench_function("mixed_workload", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut book = Book::with_capacity(1 << 20);
        let mut active: Vec<u64> = Vec::new();
        let mut order_id = 0u64;

        b.iter(|| {
            if active.is_empty() || rng.gen_bool(0.7) {
                order_id += 1;
                let order = random_order(&mut rng, order_id);
                black_box(book.add_order(order));
                active.push(order_id);
            } else {
                let idx = rng.gen_range(0..active.len());
                let id = active.swap_remove(idx);
                book.cancel_order(id);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_add_no_match,
    bench_add_full_match,
    bench_cancel,
    bench_mixed_workload
);
criterion_main!(benches);
