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

//! Fuzz target for address-map mutations.
//!
//! This fuzzer drives a random add/edit/remove sequence and checks the
//! cross-view validator after every step. Mutations may be rejected; the
//! map must stay consistent and queries must never panic.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_map
//!
//! Run for a specific duration:
//!   cargo +nightly fuzz run fuzz_map -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use mamba65::{Address, AddressMap, RegionLen};

const SPAN: u32 = 0x2000;

fuzz_target!(|data: &[u8]| {
    let Ok(mut map) = AddressMap::new(SPAN) else {
        return;
    };

    for chunk in data.chunks_exact(8) {
        let offset = u32::from(u16::from_le_bytes([chunk[0], chunk[1]])) % SPAN;
        let len_raw = u16::from_le_bytes([chunk[2], chunk[3]]);
        let len = if len_raw % 8 == 0 {
            RegionLen::Floating
        } else {
            RegionLen::Fixed(u32::from(len_raw))
        };
        let address = if chunk[4] % 8 == 0 {
            Address::NonAddressable
        } else {
            Address::Addressable(u32::from(u16::from_le_bytes([chunk[5], chunk[6]])))
        };

        match chunk[7] % 4 {
            0 | 1 => {
                let _ = map.add_region(offset, len, address, chunk[7] & 0x80 != 0);
            }
            2 => {
                map.edit_region(offset, len, address, chunk[7] & 0x80 != 0);
            }
            _ => {
                map.remove_region(offset, len);
            }
        }
        map.check_consistency()
            .expect("views diverged after mutation");

        let _ = map.offset_to_address(offset);
        let _ = map.address_to_offset(offset, u32::from(len_raw));
        let _ = map.is_range_unbroken(offset, 4);
    }

    // Whatever survived must reload identically from its flat form.
    let reloaded = AddressMap::from_entries(map.span_length(), map.entries())
        .expect("own entries must reload");
    assert_eq!(map, reloaded);
});
