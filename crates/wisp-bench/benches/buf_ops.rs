//! Criterion micro-benchmarks for put, cat, trim and the capacity planner.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use wisp_bench::{filled, fragments, total_len};
use wisp_buf::WispBuf;

/// 1000 appends of 16 bytes with no reservation: one reallocation each.
fn bench_cat_small_unreserved(c: &mut Criterion) {
    let parts = fragments(1000, 16);
    c.bench_function("cat_1000x16_unreserved", |b| {
        b.iter(|| {
            let mut s = WispBuf::new();
            for p in &parts {
                s.cat(p).unwrap();
            }
            black_box(s.len())
        });
    });
}

/// The same appends after a single make_room_for.
fn bench_cat_small_reserved(c: &mut Criterion) {
    let parts = fragments(1000, 16);
    let total = total_len(&parts);
    c.bench_function("cat_1000x16_reserved", |b| {
        b.iter(|| {
            let mut s = WispBuf::new();
            s.make_room_for(total).unwrap();
            for p in &parts {
                s.cat(p).unwrap();
            }
            black_box(s.len())
        });
    });
}

/// Replacing contents within existing capacity.
fn bench_put_in_place(c: &mut Criterion) {
    let mut s = filled(4096, b'x').unwrap();
    let src = vec![b'y'; 4096];
    c.bench_function("put_4k_in_place", |b| {
        b.iter(|| {
            s.put(black_box(&src)).unwrap();
        });
    });
}

fn bench_trim(c: &mut Criterion) {
    c.bench_function("trim_4k_padded", |b| {
        b.iter_batched(
            || {
                let mut s = WispBuf::new();
                s.cat(&[b' '; 1024]).unwrap();
                s.cat(&[b'q'; 2048]).unwrap();
                s.cat(&[b' '; 1024]).unwrap();
                s
            },
            |mut s| {
                s.trim(b" \t\n");
                black_box(s.len())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_cat_small_unreserved,
    bench_cat_small_reserved,
    bench_put_in_place,
    bench_trim
);
criterion_main!(benches);
