use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Bencher, BenchmarkId, Criterion, Throughput};
use symtab_core::{EncodingPolicy, InternTable, TextEncoding};

fn gen_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("symbol-{}", i)).collect()
}

fn bench_intern_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern_miss");
    for &n in &[1_000usize, 10_000] {
        let names = gen_names(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("fresh_table", n), &n, |b: &mut Bencher, _| {
            b.iter(|| {
                let table = InternTable::new(EncodingPolicy::new(TextEncoding::Utf8));
                for name in &names {
                    black_box(table.intern_symbol(name.as_bytes(), name.len()).unwrap());
                }
                black_box(table)
            })
        });
    }
    group.finish();
}

fn bench_intern_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern_hit");
    for &n in &[1_000usize, 10_000] {
        let names = gen_names(n);
        let table = InternTable::new(EncodingPolicy::new(TextEncoding::Utf8));
        for name in &names {
            table.intern(name).unwrap();
        }

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("symbol", n), &n, |b: &mut Bencher, _| {
            b.iter(|| {
                for name in &names {
                    black_box(table.intern_symbol(name.as_bytes(), name.len()).unwrap());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("keyword", n), &n, |b: &mut Bencher, _| {
            b.iter(|| {
                for name in &names {
                    black_box(table.make_keyword(name.as_bytes(), name.len()).unwrap());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_intern_miss, bench_intern_hit);
criterion_main!(benches);
