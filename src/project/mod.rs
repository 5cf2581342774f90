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

//! Flat-entry serialization of the address map.
//!
//! A map persists as `(span_length, [entry, ...])` in JSON. The enum-shaped
//! length and address fields flatten to signed integers on the wire, using
//! the well-known sentinels [`FLOATING_LEN`] and [`NON_ADDR`]; both constants
//! are fixed forever because project files written by older builds must keep
//! loading.
//!
//! Loading replays every entry through `add_region` on a fresh map, so a
//! hand-edited or corrupted file fails with the same typed errors an
//! interactive edit would.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::map::region::{Address, Region, RegionLen, FLOATING_LEN, NON_ADDR};
use crate::map::AddressMap;

/// Wire form of one region entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// File offset of the first byte.
    pub offset: u32,
    /// Positive byte count, or [`FLOATING_LEN`].
    pub length: i64,
    /// CPU address of the first byte, or [`NON_ADDR`].
    pub address: i64,
    /// Advisory relative-origin flag.
    #[serde(default)]
    pub is_relative: bool,
}

/// Wire form of a whole map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFile {
    /// Total file size the map covers.
    pub span_length: u32,
    /// Flat entry list in stored order.
    pub entries: Vec<RawEntry>,
}

impl From<&Region> for RawEntry {
    fn from(region: &Region) -> RawEntry {
        RawEntry {
            offset: region.offset,
            length: match region.len {
                RegionLen::Fixed(len) => i64::from(len),
                RegionLen::Floating => FLOATING_LEN,
            },
            address: match region.address {
                Address::Addressable(addr) => i64::from(addr),
                Address::NonAddressable => NON_ADDR,
            },
            is_relative: region.is_relative,
        }
    }
}

impl RawEntry {
    /// Decode into a region. `None` when a field is neither in range nor a
    /// known sentinel; the caller reports the entry index.
    fn decode(&self) -> Option<Region> {
        let len = match self.length {
            FLOATING_LEN => RegionLen::Floating,
            n if n > 0 && n <= i64::from(u32::MAX) => RegionLen::Fixed(n as u32),
            _ => return None,
        };
        let address = match self.address {
            NON_ADDR => Address::NonAddressable,
            n if (0..=i64::from(u32::MAX)).contains(&n) => Address::Addressable(n as u32),
            _ => return None,
        };
        Some(Region::new(self.offset, len, address, self.is_relative))
    }
}

/// Snapshot a map into its wire form.
pub fn to_map_file(map: &AddressMap) -> MapFile {
    MapFile {
        span_length: map.span_length(),
        entries: map.entries().iter().map(RawEntry::from).collect(),
    }
}

/// Rebuild a map from its wire form.
pub fn from_map_file(file: &MapFile) -> Result<AddressMap, LoadError> {
    let mut entries = Vec::with_capacity(file.entries.len());
    for (index, raw) in file.entries.iter().enumerate() {
        entries.push(raw.decode().ok_or(LoadError::Entry {
            index,
            source: crate::error::AddError::InvalidValue,
        })?);
    }
    AddressMap::from_entries(file.span_length, &entries)
}

/// Serialize a map to pretty-printed JSON.
pub fn to_json(map: &AddressMap) -> Result<String, LoadError> {
    Ok(serde_json::to_string_pretty(&to_map_file(map))?)
}

/// Rebuild a map from JSON text.
pub fn from_json(text: &str) -> Result<AddressMap, LoadError> {
    let file: MapFile = serde_json::from_str(text)?;
    from_map_file(&file)
}

/// Write a map to a JSON file.
pub fn save_map(map: &AddressMap, path: &Path) -> Result<(), LoadError> {
    std::fs::write(path, to_json(map)?)?;
    Ok(())
}

/// Read a map from a JSON file.
pub fn load_map(path: &Path) -> Result<AddressMap, LoadError> {
    from_json(&std::fs::read_to_string(path)?)
}
