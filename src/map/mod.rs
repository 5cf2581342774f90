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

//! The address map: file offsets bound to CPU addresses.
//!
//! [`AddressMap`] keeps an authoritative, sorted list of [`Region`] entries
//! and two derived views over it: a containment tree that answers address
//! queries, and a linear change stream that code generation walks in offset
//! order. Both derived views are rebuilt wholesale on every mutation, so a
//! mutation's effects are visible atomically in all three views.
//!
//! The map is single-writer. Readers may share it freely between mutations;
//! nothing here synchronizes concurrent access.

pub mod changes;
pub mod region;
mod tree;
mod validate;

use crate::error::{AddError, ConsistencyError, LoadError};
use changes::ChangeStream;
use region::{Address, Region, RegionLen, ResolvedRegion, ADDR_MAX, SPAN_MAX};
use tree::Tree;

/// Maps byte offsets in a file image to the CPU addresses the code executed
/// under, supporting nested and overlapping regions.
///
/// # Example
///
/// ```
/// use mamba65::{Address, AddressMap, RegionLen};
///
/// let mut map = AddressMap::new(0x8000)?;
/// map.add_region(0x0000, RegionLen::Fixed(0x200), Address::Addressable(0x1000), false)?;
/// map.add_region(0x0200, RegionLen::Fixed(0x500), Address::Addressable(0x1200), false)?;
///
/// assert_eq!(map.offset_to_address(0x250), Address::Addressable(0x1250));
/// assert_eq!(map.address_to_offset(0x000, 0x1250), Some(0x250));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMap {
    span_length: u32,
    /// Sorted by ascending offset, then descending length, so an enclosing
    /// parent precedes its same-start children.
    regions: Vec<Region>,
    tree: Tree,
    changes: ChangeStream,
}

impl AddressMap {
    /// Create an empty map over a file of `span_length` bytes.
    ///
    /// Fails with [`AddError::InvalidValue`] when the span is zero or larger
    /// than 16 MiB.
    pub fn new(span_length: u32) -> Result<AddressMap, AddError> {
        if span_length == 0 || span_length > SPAN_MAX {
            return Err(AddError::InvalidValue);
        }
        let tree = Tree::build(span_length, &[]);
        let changes = ChangeStream::build(&tree);
        Ok(AddressMap {
            span_length,
            regions: Vec::new(),
            tree,
            changes,
        })
    }

    /// Rebuild a map from its flat entry form.
    ///
    /// Every entry goes through [`add_region`](Self::add_region); caller
    /// ordering is never trusted. Any rejection is a hard error naming the
    /// offending entry.
    pub fn from_entries(span_length: u32, entries: &[Region]) -> Result<AddressMap, LoadError> {
        let mut map = AddressMap::new(span_length).map_err(|_| LoadError::InvalidSpan {
            span: span_length,
        })?;
        for (index, entry) in entries.iter().enumerate() {
            map.add_region(entry.offset, entry.len, entry.address, entry.is_relative)
                .map_err(|source| LoadError::Entry { index, source })?;
        }
        Ok(map)
    }

    /// Total file size the map covers.
    pub fn span_length(&self) -> u32 {
        self.span_length
    }

    /// The authoritative entries in stored order. This is the stable
    /// serialization order.
    pub fn entries(&self) -> &[Region] {
        &self.regions
    }

    /// Number of regions in the map.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// All regions starting exactly at `offset`, in stored order
    /// (outermost first).
    pub fn regions_at(&self, offset: u32) -> &[Region] {
        let from = self.regions.partition_point(|r| r.offset < offset);
        let to = self.regions.partition_point(|r| r.offset <= offset);
        &self.regions[from..to]
    }

    /// Add a region to the map.
    ///
    /// The new region must be disjoint from, fully contain, or be fully
    /// contained by every existing region; partial overlap is rejected.
    /// A floating length is resolved by the tree and treated during
    /// insertion as ending before any later sibling.
    pub fn add_region(
        &mut self,
        offset: u32,
        len: RegionLen,
        address: Address,
        is_relative: bool,
    ) -> Result<(), AddError> {
        self.check_args(offset, len, address)?;

        let ins = self.find_insert_index(offset, len)?;
        self.check_straddle(ins, offset, len)?;

        self.regions
            .insert(ins, Region::new(offset, len, address, is_relative));
        self.rebuild();
        Ok(())
    }

    /// Replace the address and relative flag of the region identified by
    /// `(offset, len)`. Returns `false` when no such region exists or the
    /// new address is out of range. Offset and length cannot change; remove
    /// and re-add to resize.
    pub fn edit_region(
        &mut self,
        offset: u32,
        len: RegionLen,
        address: Address,
        is_relative: bool,
    ) -> bool {
        if !address_in_range(address) {
            return false;
        }
        let Some(index) = self.regions.iter().position(|r| r.matches(offset, len)) else {
            return false;
        };
        self.regions[index] = Region::new(offset, len, address, is_relative);
        self.rebuild();
        true
    }

    /// Remove the region identified by `(offset, len)`. Returns `false` when
    /// no such region exists.
    pub fn remove_region(&mut self, offset: u32, len: RegionLen) -> bool {
        let Some(index) = self.regions.iter().position(|r| r.matches(offset, len)) else {
            return false;
        };
        self.regions.remove(index);
        self.rebuild();
        true
    }

    /// The CPU address of the byte at `offset`, per the innermost region
    /// containing it. Non-addressable for gaps, loader headers, and offsets
    /// outside the file span.
    pub fn offset_to_address(&self, offset: u32) -> Address {
        if offset >= self.span_length {
            return Address::NonAddressable;
        }
        self.tree.offset_to_address(offset)
    }

    /// The file offset `target_addr` refers to, as seen from the code at
    /// `src_offset`. Scope-aware: overlapping mappings resolve within the
    /// source's scope before widening outward. `None` when no visible region
    /// maps the address.
    pub fn address_to_offset(&self, src_offset: u32, target_addr: u32) -> Option<u32> {
        self.tree.address_to_offset(src_offset, target_addr)
    }

    /// True if `[offset, offset + length)` stays inside one region with no
    /// nested region carving into it. Code generation uses this to decide
    /// whether a multi-byte datum crosses an address-change boundary.
    pub fn is_range_unbroken(&self, offset: u32, length: u32) -> bool {
        if offset >= self.span_length {
            return false;
        }
        self.tree.is_range_unbroken(offset, length)
    }

    /// The ordered start/end event sequence covering the whole span.
    pub fn change_stream(&self) -> &ChangeStream {
        &self.changes
    }

    /// All regions with floating lengths resolved, in entry order.
    pub fn resolved_regions(&self) -> Vec<ResolvedRegion> {
        self.tree.resolved_regions()
    }

    /// Verify that the three views agree. Mutations assert this in debug
    /// builds; tests and fuzzing call it directly.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        validate::check(self.span_length, &self.regions, &self.tree, &self.changes)
    }

    fn rebuild(&mut self) {
        self.tree = Tree::build(self.span_length, &self.regions);
        self.changes = ChangeStream::build(&self.tree);
        debug_assert_eq!(self.check_consistency(), Ok(()));
    }

    fn check_args(&self, offset: u32, len: RegionLen, address: Address) -> Result<(), AddError> {
        if offset >= self.span_length {
            return Err(AddError::InvalidValue);
        }
        if let RegionLen::Fixed(len) = len {
            if len == 0 || u64::from(offset) + u64::from(len) > u64::from(self.span_length) {
                return Err(AddError::InvalidValue);
            }
        }
        if !address_in_range(address) {
            return Err(AddError::InvalidValue);
        }
        Ok(())
    }

    /// Locate the insertion index for `(offset, len)` while scanning for
    /// identity and floating collisions.
    fn find_insert_index(&self, offset: u32, len: RegionLen) -> Result<usize, AddError> {
        let mut ins = None;
        for (i, existing) in self.regions.iter().enumerate() {
            if existing.offset == offset {
                if existing.len == len {
                    return Err(AddError::OverlapExisting);
                }
                if existing.len.is_floating() || len.is_floating() {
                    return Err(AddError::OverlapFloating);
                }
            }
            if ins.is_none() && comes_after(existing, offset, len) {
                ins = Some(i);
            }
        }
        Ok(ins.unwrap_or(self.regions.len()))
    }

    /// Reject partial overlaps around the insertion point.
    ///
    /// Backward: the innermost existing region covering the new start (the
    /// first covering entry when walking back; everything outside it
    /// contains it) must contain the new end. Forward: every existing region
    /// starting inside the new range must end inside it.
    fn check_straddle(&self, ins: usize, offset: u32, len: RegionLen) -> Result<(), AddError> {
        // A floating region ends before any later sibling and inside any
        // enclosing region, so it cannot straddle.
        let Some(len) = len.fixed() else {
            return Ok(());
        };
        let end = offset + len;

        for existing in self.regions[..ins].iter().rev() {
            // Floating entries end before the new start; skip past them and
            // any disjoint predecessor.
            let Some(existing_end) = existing.end() else {
                continue;
            };
            if existing_end <= offset {
                continue;
            }
            if end > existing_end {
                return Err(AddError::StraddleExisting);
            }
            break;
        }

        for existing in &self.regions[ins..] {
            if existing.offset >= end {
                break;
            }
            if let Some(existing_end) = existing.end() {
                if existing_end > end {
                    return Err(AddError::StraddleExisting);
                }
            }
        }
        Ok(())
    }
}

fn address_in_range(address: Address) -> bool {
    match address {
        Address::Addressable(addr) => addr <= ADDR_MAX,
        Address::NonAddressable => true,
    }
}

/// Sort-order test: does `existing` belong after a new `(offset, len)`
/// entry? Among same-offset entries a longer length sorts first; mixed
/// floating cases were already rejected as collisions.
fn comes_after(existing: &Region, offset: u32, len: RegionLen) -> bool {
    if existing.offset != offset {
        return existing.offset > offset;
    }
    match (existing.len.fixed(), len.fixed()) {
        (Some(existing_len), Some(new_len)) => existing_len < new_len,
        _ => false,
    }
}
