//! Criterion benchmarks for accessor traversal over both pager backends.

use std::hint::black_box;

use cloudpage_access::ElementConfig;
use cloudpage_bench::{build_element, scan_valid};
use cloudpage_core::ProcessingLocation;
use cloudpage_test_utils::populated_i32_element;
use criterion::{criterion_group, criterion_main, Criterion};

const POINTS: u32 = 200_000;

fn bench_scan_in_memory(c: &mut Criterion) {
    let element =
        build_element(POINTS, ProcessingLocation::InMemory, ElementConfig::new()).unwrap();
    c.bench_function("scan_valid_in_memory_200k", |b| {
        b.iter(|| black_box(scan_valid(&element)));
    });
}

fn bench_scan_memory_mapped(c: &mut Criterion) {
    let element =
        build_element(POINTS, ProcessingLocation::OnDisk, ElementConfig::new()).unwrap();
    c.bench_function("scan_valid_mmap_200k", |b| {
        b.iter(|| black_box(scan_valid(&element)));
    });
}

fn bench_small_blocks(c: &mut Criterion) {
    let config = ElementConfig::new().with_block_points(1024);
    let element = build_element(POINTS, ProcessingLocation::InMemory, config).unwrap();
    c.bench_function("scan_valid_1k_blocks_200k", |b| {
        b.iter(|| black_box(scan_valid(&element)));
    });
}

fn bench_strided_to_index(c: &mut Criterion) {
    let (element, _) = populated_i32_element(POINTS, ElementConfig::new().with_block_points(4096));
    c.bench_function("to_index_stride_997_200k", |b| {
        b.iter(|| {
            let accessor = element.get_point_cloud_accessor(None);
            let mut cursor = accessor.cursor();
            let mut sum = 0i64;
            let mut i = 0u32;
            while i < POINTS {
                cursor.to_index(i);
                sum += cursor.x_as_integer(false);
                i += 997;
            }
            black_box(sum)
        });
    });
}

criterion_group!(
    benches,
    bench_scan_in_memory,
    bench_scan_memory_mapped,
    bench_small_blocks,
    bench_strided_to_index
);
criterion_main!(benches);
