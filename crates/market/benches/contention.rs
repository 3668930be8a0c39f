use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::thread;

use agora_market::Marketplace;

const PRODUCTS: [&str; 4] = ["tea", "coffee", "mate", "cocoa"];
const ROUNDS: usize = 1_000;

/// One producer/consumer pair per thread, all sharing one registry. Each pair
/// trades its own product, so a full buffer can always be drained by its
/// own consumer.
fn trade(threads: usize) -> u64 {
    let market: Marketplace<String> = Marketplace::new(8).unwrap();
    thread::scope(|s| {
        for t in 0..threads {
            let market = &market;
            s.spawn(move || {
                let producer = market.register_producer().unwrap();
                let cart = market.new_cart().unwrap();
                let product = format!("{}-{t}", PRODUCTS[t % PRODUCTS.len()]);
                for _ in 0..ROUNDS {
                    while !market.publish(producer, product.clone()).unwrap() {
                        let _ = market.add_to_cart(cart, &product).unwrap();
                    }
                    let _ = market.add_to_cart(cart, &product).unwrap();
                }
                black_box(market.place_order(cart).unwrap());
            });
        }
    });
    market.stats().unwrap().sold
}

fn bench_single_thread_cycle(c: &mut Criterion) {
    let market: Marketplace<&'static str> = Marketplace::new(64).unwrap();
    let producers: Vec<_> = (0..16).map(|_| market.register_producer().unwrap()).collect();
    let cart = market.new_cart().unwrap();

    c.bench_function("publish_claim_order", |b| {
        b.iter(|| {
            let last = *producers.last().unwrap();
            market.publish(last, "tea").unwrap();
            // worst case for the scan: the match sits in the last buffer
            market.add_to_cart(cart, black_box(&"tea")).unwrap();
            black_box(market.place_order(cart).unwrap())
        })
    });
}

fn bench_contended_trade(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_trade");
    for threads in [1usize, 2, 4, 8] {
        group.throughput(Throughput::Elements((threads * ROUNDS) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &t| {
            b.iter(|| trade(t))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_thread_cycle, bench_contended_trade);
criterion_main!(benches);
