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

//! Linear change stream over the address map.
//!
//! Code generation walks file offsets in order and needs to know where the
//! address mapping changes. The stream renders the containment tree as a
//! properly nested sequence of start/end events covering the whole file
//! span; gaps between top-level regions are filled with synthesized
//! non-addressable regions so consumers never see an uncovered offset.

use super::region::{Address, ResolvedRegion};
use super::tree::Tree;

/// Identifies the region a [`ChangeEvent`] originates from, within its
/// owning [`ChangeStream`]. The start and end events of one region carry the
/// same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(usize);

/// Whether an event opens or closes a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The region's mapping takes effect at `offset`.
    Start,
    /// The region ended just before `offset`; the parent's mapping resumes.
    End,
}

/// One boundary in the linear walk of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Start or end.
    pub kind: ChangeKind,
    /// For `End`, the offset just past the region's last byte.
    pub offset: u32,
    /// The address in effect at `offset` after this change. For an `End`
    /// this is the address resuming in the parent's space, so a consumer can
    /// emit a "resume at" directive without recomputing the enclosing
    /// context.
    pub address: Address,
    /// The originating region; resolve through [`ChangeStream::region`].
    pub region: RegionId,
}

/// A region as seen by the change stream: resolved, and possibly synthesized
/// to fill a top-level gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRegion {
    /// The resolved extent and mapping.
    pub region: ResolvedRegion,
    /// True for gap fillers that have no region list entry.
    pub synthesized: bool,
}

/// The ordered event sequence. Rebuilt wholesale on every map mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeStream {
    regions: Vec<StreamRegion>,
    events: Vec<ChangeEvent>,
    filler_count: usize,
}

impl ChangeStream {
    /// Render the tree's top level, synthesizing fillers for the edges and
    /// for gaps between top-level regions.
    pub(crate) fn build(tree: &Tree) -> ChangeStream {
        let mut stream = ChangeStream::default();
        let span = tree.root_region().len;
        let mut cursor = 0;
        for &child in &tree.node(0).children {
            let start = tree.node(child).region.offset;
            if start > cursor {
                stream.emit_filler(cursor, start);
            }
            stream.emit_node(tree, child);
            cursor = tree.node(child).region.end();
        }
        if cursor < span {
            stream.emit_filler(cursor, span);
        }
        stream
    }

    fn emit_node(&mut self, tree: &Tree, index: usize) {
        let node = tree.node(index);
        let id = RegionId(self.regions.len());
        self.regions.push(StreamRegion {
            region: node.region,
            synthesized: false,
        });

        self.events.push(ChangeEvent {
            kind: ChangeKind::Start,
            offset: node.region.offset,
            address: node.region.address,
            region: id,
        });
        for &child in &node.children {
            self.emit_node(tree, child);
        }

        let end_offset = node.region.end();
        let parent = &tree
            .node(node.parent.expect("non-root node has a parent"))
            .region;
        self.events.push(ChangeEvent {
            kind: ChangeKind::End,
            offset: end_offset,
            address: parent.address.advance(end_offset - parent.offset),
            region: id,
        });
    }

    fn emit_filler(&mut self, from: u32, to: u32) {
        let id = RegionId(self.regions.len());
        self.regions.push(StreamRegion {
            region: ResolvedRegion {
                offset: from,
                len: to - from,
                address: Address::NonAddressable,
                is_relative: false,
                was_floating: false,
            },
            synthesized: true,
        });
        self.filler_count += 1;
        self.events.push(ChangeEvent {
            kind: ChangeKind::Start,
            offset: from,
            address: Address::NonAddressable,
            region: id,
        });
        self.events.push(ChangeEvent {
            kind: ChangeKind::End,
            offset: to,
            address: Address::NonAddressable,
            region: id,
        });
    }

    /// All events in file order.
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    /// Iterate events in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEvent> {
        self.events.iter()
    }

    /// The region an event originated from.
    pub fn region(&self, id: RegionId) -> &StreamRegion {
        &self.regions[id.0]
    }

    /// Number of events in the stream.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when the stream holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of synthesized gap fillers.
    pub fn filler_count(&self) -> usize {
        self.filler_count
    }

    /// Number of distinct regions in the stream, fillers included.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl<'a> IntoIterator for &'a ChangeStream {
    type Item = &'a ChangeEvent;
    type IntoIter = std::slice::Iter<'a, ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::region::{Region, RegionLen};

    fn build(span: u32, regions: &[Region]) -> ChangeStream {
        ChangeStream::build(&Tree::build(span, regions))
    }

    fn region(offset: u32, len: u32, address: Address) -> Region {
        Region::new(offset, RegionLen::Fixed(len), address, false)
    }

    #[test]
    fn test_empty_map_is_one_filler() {
        let stream = build(0x8000, &[]);
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.filler_count(), 1);
        let start = stream.events()[0];
        let end = stream.events()[1];
        assert_eq!(start.kind, ChangeKind::Start);
        assert_eq!(start.offset, 0);
        assert_eq!(end.kind, ChangeKind::End);
        assert_eq!(end.offset, 0x8000);
        assert_eq!(start.region, end.region);
        assert!(stream.region(start.region).synthesized);
    }

    #[test]
    fn test_gaps_synthesize_fillers() {
        let stream = build(0x8000, &[region(0x1000, 0x100, Address::Addressable(0x2000))]);
        let kinds: Vec<(ChangeKind, u32)> =
            stream.iter().map(|e| (e.kind, e.offset)).collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeKind::Start, 0x0000),
                (ChangeKind::End, 0x1000),
                (ChangeKind::Start, 0x1000),
                (ChangeKind::End, 0x1100),
                (ChangeKind::Start, 0x1100),
                (ChangeKind::End, 0x8000),
            ]
        );
        assert_eq!(stream.filler_count(), 2);
        assert!(stream.region(stream.events()[0].region).synthesized);
        assert!(!stream.region(stream.events()[2].region).synthesized);
        assert_eq!(stream.events()[2].address, Address::Addressable(0x2000));
        // Top-level regions resume into the non-addressable root.
        assert_eq!(stream.events()[3].address, Address::NonAddressable);
    }

    #[test]
    fn test_flush_regions_need_no_fillers() {
        let stream = build(
            0x400,
            &[
                region(0x000, 0x200, Address::Addressable(0x1000)),
                region(0x200, 0x200, Address::Addressable(0x2000)),
            ],
        );
        assert_eq!(stream.filler_count(), 0);
        assert_eq!(stream.len(), 4);
    }

    #[test]
    fn test_end_event_resumes_parent_address() {
        let stream = build(
            0x1000,
            &[
                region(0x000, 0x1000, Address::Addressable(0x8000)),
                region(0x100, 0x200, Address::Addressable(0xE000)),
            ],
        );
        let kinds: Vec<(ChangeKind, u32, Address)> = stream
            .iter()
            .map(|e| (e.kind, e.offset, e.address))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeKind::Start, 0x000, Address::Addressable(0x8000)),
                (ChangeKind::Start, 0x100, Address::Addressable(0xE000)),
                // The child ends at 0x300; the parent mapping resumes there.
                (ChangeKind::End, 0x300, Address::Addressable(0x8300)),
                (ChangeKind::End, 0x1000, Address::NonAddressable),
            ]
        );
    }

    #[test]
    fn test_end_inside_non_addressable_parent() {
        let stream = build(
            0x1000,
            &[
                Region::new(
                    0x000,
                    RegionLen::Fixed(0x1000),
                    Address::NonAddressable,
                    false,
                ),
                region(0x100, 0x200, Address::Addressable(0xE000)),
            ],
        );
        let child_end = stream
            .iter()
            .find(|e| e.kind == ChangeKind::End && e.offset == 0x300)
            .expect("child end event");
        assert_eq!(child_end.address, Address::NonAddressable);
    }

    #[test]
    fn test_events_share_region_reference() {
        let stream = build(0x8000, &[region(0x1000, 0x100, Address::Addressable(0x2000))]);
        let starts: Vec<RegionId> = stream
            .iter()
            .filter(|e| e.kind == ChangeKind::Start)
            .map(|e| e.region)
            .collect();
        let ends: Vec<RegionId> = stream
            .iter()
            .filter(|e| e.kind == ChangeKind::End)
            .map(|e| e.region)
            .collect();
        assert_eq!(starts, ends);
    }

    #[test]
    fn test_is_relative_carried_through() {
        let mut entry = region(0x000, 0x100, Address::Addressable(0x1000));
        entry.is_relative = true;
        let stream = build(0x100, &[entry]);
        let start = stream.events()[0];
        assert!(stream.region(start.region).region.is_relative);
    }

    #[test]
    fn test_nesting_balances() {
        let stream = build(
            0x4000,
            &[
                region(0x0000, 0x2000, Address::Addressable(0x8000)),
                region(0x2000, 0x2000, Address::Addressable(0x8000)),
                region(0x2100, 0x200, Address::Addressable(0xE100)),
                region(0x3100, 0x200, Address::Addressable(0xF100)),
            ],
        );
        let mut stack = Vec::new();
        for event in &stream {
            match event.kind {
                ChangeKind::Start => stack.push(event.region),
                ChangeKind::End => assert_eq!(stack.pop(), Some(event.region)),
            }
        }
        assert!(stack.is_empty());
        assert_eq!(stream.len(), 2 * stream.region_count());
    }
}
