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

//! Region value types for the address map.
//!
//! A [`Region`] binds a half-open range of file offsets to a contiguous range
//! of CPU addresses. Regions are immutable once constructed; the map replaces
//! entries wholesale on edit.

use std::fmt;

/// Largest representable file offset (24 bits).
pub const OFFSET_MAX: u32 = (1 << 24) - 1;

/// Largest representable CPU address (24 bits).
pub const ADDR_MAX: u32 = (1 << 24) - 1;

/// Largest supported file span (16 MiB).
pub const SPAN_MAX: u32 = 1 << 24;

/// Serialized sentinel for a floating region length.
pub const FLOATING_LEN: i64 = -1024;

/// Serialized sentinel for a non-addressable region.
pub const NON_ADDR: i64 = -1025;

/// The length of a region.
///
/// A floating length means "extends to the next natural boundary": the start
/// of the next region, or the end of the enclosing region, whichever comes
/// first. Floating lengths are resolved by the containment tree and are never
/// stored resolved in the region list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLen {
    /// A known byte count, at least 1.
    Fixed(u32),
    /// Extends to the next boundary.
    Floating,
}

impl RegionLen {
    /// Whether this length is the floating placeholder.
    pub fn is_floating(&self) -> bool {
        matches!(self, RegionLen::Floating)
    }

    /// The byte count, if known.
    pub fn fixed(&self) -> Option<u32> {
        match self {
            RegionLen::Fixed(len) => Some(*len),
            RegionLen::Floating => None,
        }
    }
}

impl fmt::Display for RegionLen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionLen::Fixed(len) => write!(f, "{:#x}", len),
            RegionLen::Floating => write!(f, "(floating)"),
        }
    }
}

/// The CPU address a region maps to.
///
/// Loader headers and other file-only blobs carry no CPU address at all;
/// they are `NonAddressable` rather than mapped to a fake location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// A 24-bit CPU address.
    Addressable(u32),
    /// No CPU address exists for this range.
    NonAddressable,
}

impl Address {
    /// The numeric address, if one exists.
    pub fn value(&self) -> Option<u32> {
        match self {
            Address::Addressable(addr) => Some(*addr),
            Address::NonAddressable => None,
        }
    }

    /// Whether this is a real CPU address.
    pub fn is_addressable(&self) -> bool {
        matches!(self, Address::Addressable(_))
    }

    /// The address advanced by `delta` bytes, `NonAddressable` unchanged.
    pub fn advance(&self, delta: u32) -> Address {
        match self {
            Address::Addressable(addr) => Address::Addressable(addr + delta),
            Address::NonAddressable => Address::NonAddressable,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Addressable(addr) if *addr <= 0xFFFF => write!(f, "${:04X}", addr),
            Address::Addressable(addr) => write!(f, "${:06X}", addr),
            Address::NonAddressable => write!(f, "NA"),
        }
    }
}

/// An authoritative map entry.
///
/// Identified structurally by `(offset, len)`; a floating region is matched
/// by `(offset, Floating)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Byte position in the file image.
    pub offset: u32,
    /// Byte count or the floating placeholder.
    pub len: RegionLen,
    /// CPU address of the first byte.
    pub address: Address,
    /// Advisory flag for code generation; the core carries it untouched.
    pub is_relative: bool,
}

impl Region {
    /// Create a region. Range validation happens when the region is added
    /// to a map.
    pub fn new(offset: u32, len: RegionLen, address: Address, is_relative: bool) -> Self {
        Self {
            offset,
            len,
            address,
            is_relative,
        }
    }

    /// End offset (exclusive), if the length is known.
    pub fn end(&self) -> Option<u32> {
        self.len.fixed().map(|len| self.offset + len)
    }

    /// Structural identity test against an `(offset, length)` pair.
    pub fn matches(&self, offset: u32, len: RegionLen) -> bool {
        self.offset == offset && self.len == len
    }
}

/// A region with its floating length resolved by the containment tree.
///
/// Resolved regions are derived values; they are rebuilt from the region
/// list on every mutation and never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRegion {
    /// Byte position in the file image.
    pub offset: u32,
    /// Actual byte count, floating lengths resolved.
    pub len: u32,
    /// CPU address of the first byte.
    pub address: Address,
    /// Advisory flag carried from the authoritative entry.
    pub is_relative: bool,
    /// True if the authoritative entry had a floating length. Needed to match
    /// structural identity back to the region list.
    pub was_floating: bool,
}

impl ResolvedRegion {
    /// End offset (exclusive).
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Whether `offset` falls inside this region.
    pub fn contains_offset(&self, offset: u32) -> bool {
        offset >= self.offset && offset < self.end()
    }

    /// The structural length this region had in the region list.
    pub fn source_len(&self) -> RegionLen {
        if self.was_floating {
            RegionLen::Floating
        } else {
            RegionLen::Fixed(self.len)
        }
    }
}
