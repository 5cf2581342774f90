// Mamba65 - An address-map core for a 6502/65816 disassembler
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Performance benchmarks for the address map.
//!
//! Run with: cargo bench
//!
//! Results are saved to target/criterion/ with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mamba65::{Address, AddressMap, Region, RegionLen};

// ============================================================================
// Benchmark Inputs
// ============================================================================

/// A bank-switched layout: `banks` top-level banks of 0x2000 bytes, each
/// holding a small overlay child, the shape large overlaid images produce.
fn banked_entries(banks: u32) -> (u32, Vec<Region>) {
    let span = banks * 0x2000;
    let mut entries = Vec::with_capacity(2 * banks as usize);
    for bank in 0..banks {
        let offset = bank * 0x2000;
        entries.push(Region::new(
            offset,
            RegionLen::Fixed(0x2000),
            Address::Addressable(0x8000),
            false,
        ));
        entries.push(Region::new(
            offset + 0x100,
            RegionLen::Fixed(0x200),
            Address::Addressable(0xE000),
            false,
        ));
    }
    (span, entries)
}

fn banked_map(banks: u32) -> AddressMap {
    let (span, entries) = banked_entries(banks);
    AddressMap::from_entries(span, &entries).expect("benchmark map is valid")
}

// ============================================================================
// Construction Benchmarks
// ============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for banks in [8u32, 64, 512] {
        let (span, entries) = banked_entries(banks);
        group.throughput(Throughput::Elements(entries.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("from_entries", banks),
            &entries,
            |b, entries| {
                b.iter(|| AddressMap::from_entries(span, black_box(entries)).unwrap())
            },
        );
    }
    group.finish();
}

fn bench_mutation(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutation");
    for banks in [8u32, 64, 512] {
        let map = banked_map(banks);
        // One add + remove pair, paying the full derived-view rebuild twice.
        group.bench_with_input(BenchmarkId::new("add_remove", banks), &map, |b, map| {
            b.iter_batched(
                || map.clone(),
                |mut map| {
                    map.add_region(
                        0x1800,
                        RegionLen::Fixed(0x100),
                        Address::Addressable(0x4000),
                        false,
                    )
                    .unwrap();
                    map.remove_region(0x1800, RegionLen::Fixed(0x100));
                    map
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

// ============================================================================
// Query Benchmarks
// ============================================================================

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    for banks in [8u32, 64, 512] {
        let map = banked_map(banks);
        let span = map.span_length();

        group.bench_with_input(
            BenchmarkId::new("offset_to_address", banks),
            &map,
            |b, map| {
                b.iter(|| {
                    let mut acc = 0u32;
                    for offset in (0..span).step_by(0x400) {
                        if let Address::Addressable(addr) =
                            map.offset_to_address(black_box(offset))
                        {
                            acc = acc.wrapping_add(addr);
                        }
                    }
                    acc
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("address_to_offset", banks),
            &map,
            |b, map| {
                // Worst case: the overlay address misses the local bank and
                // the search climbs and scans siblings.
                b.iter(|| map.address_to_offset(black_box(0x1000), black_box(0xE150)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("is_range_unbroken", banks),
            &map,
            |b, map| b.iter(|| map.is_range_unbroken(black_box(0x1FFE), black_box(4))),
        );
    }
    group.finish();
}

fn bench_change_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("change_stream");
    for banks in [8u32, 64, 512] {
        let map = banked_map(banks);
        group.throughput(Throughput::Elements(map.change_stream().len() as u64));
        group.bench_with_input(BenchmarkId::new("walk", banks), &map, |b, map| {
            b.iter(|| {
                let stream = map.change_stream();
                let mut depth = 0usize;
                for event in stream {
                    match event.kind {
                        mamba65::ChangeKind::Start => depth += 1,
                        mamba65::ChangeKind::End => depth -= 1,
                    }
                    black_box(event.address);
                }
                depth
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_mutation,
    bench_queries,
    bench_change_stream
);
criterion_main!(benches);
