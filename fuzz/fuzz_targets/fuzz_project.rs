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

//! Fuzz target for the project-file loader.
//!
//! This fuzzer feeds random bytes to the JSON map loader to find crashes,
//! panics, or maps that load in an inconsistent state.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_project

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Invalid UTF-8 cannot be a project file.
    if let Ok(text) = std::str::from_utf8(data) {
        // The loader should never panic, only return Ok or Err; anything
        // that loads must pass the validator and round-trip.
        if let Ok(map) = mamba65::project::from_json(text) {
            map.check_consistency().expect("loaded map is consistent");
            let json = mamba65::project::to_json(&map).expect("serialization succeeds");
            let reloaded = mamba65::project::from_json(&json).expect("round trip reloads");
            assert_eq!(map, reloaded);
        }
    }
});
