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

//! Change stream tests: the linear event walk a code generator consumes.

use mamba65::{Address, AddressMap, ChangeEvent, ChangeKind, RegionLen};

fn addr(value: u32) -> Address {
    Address::Addressable(value)
}

fn fixed(len: u32) -> RegionLen {
    RegionLen::Fixed(len)
}

fn summarize(map: &AddressMap) -> Vec<(ChangeKind, u32, Address)> {
    map.change_stream()
        .iter()
        .map(|e| (e.kind, e.offset, e.address))
        .collect()
}

#[test]
fn test_single_region_yields_six_events() {
    let mut map = AddressMap::new(0x8000).unwrap();
    map.add_region(0x1000, fixed(0x100), addr(0x2000), false).unwrap();
    assert_eq!(
        summarize(&map),
        vec![
            (ChangeKind::Start, 0x0000, Address::NonAddressable),
            (ChangeKind::End, 0x1000, Address::NonAddressable),
            (ChangeKind::Start, 0x1000, addr(0x2000)),
            (ChangeKind::End, 0x1100, Address::NonAddressable),
            (ChangeKind::Start, 0x1100, Address::NonAddressable),
            (ChangeKind::End, 0x8000, Address::NonAddressable),
        ]
    );
    assert_eq!(map.change_stream().filler_count(), 2);
}

#[test]
fn test_full_coverage_no_fillers() {
    let mut map = AddressMap::new(0x400).unwrap();
    map.add_region(0x000, fixed(0x400), addr(0xC000), false).unwrap();
    assert_eq!(
        summarize(&map),
        vec![
            (ChangeKind::Start, 0x000, addr(0xC000)),
            (ChangeKind::End, 0x400, Address::NonAddressable),
        ]
    );
    assert_eq!(map.change_stream().filler_count(), 0);
}

#[test]
fn test_nested_region_events_interleave() {
    let mut map = AddressMap::new(0x1000).unwrap();
    map.add_region(0x000, fixed(0x1000), addr(0x8000), false).unwrap();
    map.add_region(0x100, fixed(0x200), addr(0xE000), false).unwrap();
    assert_eq!(
        summarize(&map),
        vec![
            (ChangeKind::Start, 0x000, addr(0x8000)),
            (ChangeKind::Start, 0x100, addr(0xE000)),
            // The overlay ends; the outer bank's addressing resumes at the
            // offset the overlay vacated.
            (ChangeKind::End, 0x300, addr(0x8300)),
            (ChangeKind::End, 0x1000, Address::NonAddressable),
        ]
    );
}

#[test]
fn test_floating_region_end_uses_resolved_length() {
    let mut map = AddressMap::new(0x8000).unwrap();
    map.add_region(0x1000, RegionLen::Floating, addr(0x1000), false)
        .unwrap();
    map.add_region(0x4000, fixed(0x1000), addr(0x9000), false).unwrap();
    let events = summarize(&map);
    assert_eq!(events[2], (ChangeKind::Start, 0x1000, addr(0x1000)));
    assert_eq!(events[3], (ChangeKind::End, 0x4000, Address::NonAddressable));
    assert_eq!(events[4], (ChangeKind::Start, 0x4000, addr(0x9000)));
}

#[test]
fn test_event_count_formula() {
    let mut map = AddressMap::new(0x8000).unwrap();
    map.add_region(0x1000, fixed(0x1000), addr(0x8000), false).unwrap();
    map.add_region(0x1100, fixed(0x200), addr(0xE000), false).unwrap();
    map.add_region(0x4000, fixed(0x100), addr(0x2000), false).unwrap();
    let stream = map.change_stream();
    // Three real regions; fillers before 0x1000, between 0x2000 and 0x4000,
    // and after 0x4100. The nested overlay needs no filler.
    assert_eq!(stream.filler_count(), 3);
    assert_eq!(stream.len(), 2 * (3 + 3));
}

#[test]
fn test_stream_is_properly_nested() {
    let mut map = AddressMap::new(0x4000).unwrap();
    map.add_region(0x0000, fixed(0x2000), addr(0x8000), false).unwrap();
    map.add_region(0x2000, fixed(0x2000), addr(0x8000), false).unwrap();
    map.add_region(0x2100, fixed(0x200), addr(0xE100), false).unwrap();
    map.add_region(0x3100, fixed(0x200), addr(0xF100), false).unwrap();

    let stream = map.change_stream();
    let mut stack: Vec<&ChangeEvent> = Vec::new();
    for event in stream {
        match event.kind {
            ChangeKind::Start => stack.push(event),
            ChangeKind::End => {
                let start = stack.pop().expect("end without start");
                assert_eq!(start.region, event.region);
            }
        }
    }
    assert!(stack.is_empty());
}

#[test]
fn test_offsets_never_decrease() {
    let mut map = AddressMap::new(0x4000).unwrap();
    map.add_region(0x0000, fixed(0x2000), addr(0x8000), false).unwrap();
    map.add_region(0x0100, fixed(0x200), addr(0xE100), false).unwrap();
    map.add_region(0x2800, fixed(0x100), addr(0x2000), false).unwrap();
    let offsets: Vec<u32> = map.change_stream().iter().map(|e| e.offset).collect();
    for pair in offsets.windows(2) {
        assert!(pair[0] <= pair[1], "offsets went backward: {pair:?}");
    }
}

#[test]
fn test_relative_flag_reaches_consumers() {
    let mut map = AddressMap::new(0x1000).unwrap();
    map.add_region(0x000, fixed(0x800), addr(0x8000), false).unwrap();
    map.add_region(0x800, fixed(0x800), addr(0x0000), true).unwrap();
    let stream = map.change_stream();
    let flags: Vec<bool> = stream
        .iter()
        .filter(|e| e.kind == ChangeKind::Start)
        .map(|e| stream.region(e.region).region.is_relative)
        .collect();
    assert_eq!(flags, vec![false, true]);
}

#[test]
fn test_stream_rebuilt_after_mutation() {
    let mut map = AddressMap::new(0x8000).unwrap();
    map.add_region(0x1000, fixed(0x100), addr(0x2000), false).unwrap();
    let before = map.change_stream().clone();
    map.add_region(0x4000, fixed(0x100), addr(0x3000), false).unwrap();
    assert_ne!(&before, map.change_stream());
    map.remove_region(0x4000, fixed(0x100));
    assert_eq!(&before, map.change_stream());
}
