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

//! Containment tree over the region list.
//!
//! The tree is a derived view: it is rebuilt wholesale after every mutation
//! and owns nothing the region list does not already describe. Building it
//! resolves floating lengths against the enclosing region and the next
//! sibling, which is why resolved lengths live here and not in the list.
//!
//! Nodes are arena-allocated; parent and child links are indices into the
//! arena, so the upward pointers cost nothing to maintain when the whole
//! arena is discarded on the next rebuild.

use super::region::{Address, Region, RegionLen, ResolvedRegion};

/// Index of a node within the tree arena. The root is always index 0.
pub(crate) type NodeIndex = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub region: ResolvedRegion,
    pub parent: Option<NodeIndex>,
    /// Children in ascending offset order, pairwise disjoint.
    pub children: Vec<NodeIndex>,
}

/// The containment tree. The synthetic root covers the whole file span and
/// is non-addressable; every region list entry appears exactly once below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build the tree from a sorted, validated region list.
    ///
    /// The list order (ascending offset, same-offset parents first) is
    /// exactly pre-order for the containment hierarchy, so a single forward
    /// walk with recursive descent assigns every region its parent.
    pub fn build(span_length: u32, regions: &[Region]) -> Tree {
        let root = Node {
            region: ResolvedRegion {
                offset: 0,
                len: span_length,
                address: Address::NonAddressable,
                is_relative: false,
                was_floating: false,
            },
            parent: None,
            children: Vec::new(),
        };
        let mut tree = Tree { nodes: vec![root] };
        let mut next = 0;
        tree.absorb(0, regions, &mut next);
        debug_assert_eq!(next, regions.len());
        tree
    }

    /// Consume list entries that start inside `parent`, attaching each as a
    /// child and recursing so it can absorb its own descendants.
    fn absorb(&mut self, parent: NodeIndex, regions: &[Region], next: &mut usize) {
        let parent_start = self.nodes[parent].region.offset;
        let parent_end = self.nodes[parent].region.end();

        while let Some(region) = regions.get(*next) {
            if region.offset < parent_start || region.offset >= parent_end {
                break;
            }
            *next += 1;

            let (len, was_floating) = match region.len {
                RegionLen::Fixed(len) => (len, false),
                RegionLen::Floating => {
                    // Ends at the next region's start or the parent's end,
                    // whichever comes first.
                    let next_start = regions
                        .get(*next)
                        .map(|r| r.offset)
                        .unwrap_or(parent_end)
                        .min(parent_end);
                    (next_start - region.offset, true)
                }
            };

            let child = self.nodes.len();
            self.nodes.push(Node {
                region: ResolvedRegion {
                    offset: region.offset,
                    len,
                    address: region.address,
                    is_relative: region.is_relative,
                    was_floating,
                },
                parent: Some(parent),
                children: Vec::new(),
            });
            self.nodes[parent].children.push(child);

            // Resolved floating regions are leaves; everything that would
            // nest inside one becomes a sibling instead.
            if !was_floating {
                self.absorb(child, regions, next);
            }
        }
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn root_region(&self) -> &ResolvedRegion {
        &self.nodes[0].region
    }

    /// The deepest node whose range contains `offset`.
    ///
    /// Expects `offset` to lie within the file span; out-of-span offsets
    /// terminate at the root.
    pub fn node_at(&self, offset: u32) -> NodeIndex {
        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            // Siblings are disjoint, so the only candidate is the last child
            // starting at or before the target.
            let pos = node
                .children
                .partition_point(|&c| self.nodes[c].region.offset <= offset);
            if pos > 0 {
                let child = node.children[pos - 1];
                if self.nodes[child].region.contains_offset(offset) {
                    index = child;
                    continue;
                }
            }
            return index;
        }
    }

    /// The address of the byte at `offset`, per the innermost region that
    /// contains it.
    pub fn offset_to_address(&self, offset: u32) -> Address {
        let region = &self.nodes[self.node_at(offset)].region;
        region.address.advance(offset - region.offset)
    }

    /// Find the file offset that `target_addr` refers to, as seen from the
    /// code at `src_offset`.
    ///
    /// Starts in the innermost region containing `src_offset` and widens
    /// scope by scope: each round searches the current subtree child-first
    /// (more specific overlays win over their parent), then climbs one level,
    /// skipping the subtree already exhausted. The first hit wins.
    pub fn address_to_offset(&self, src_offset: u32, target_addr: u32) -> Option<u32> {
        let mut start = self.node_at(src_offset);
        let mut ignore = None;
        loop {
            if let Some(found) = self.find_address(start, ignore, target_addr) {
                return Some(found);
            }
            ignore = Some(start);
            start = self.nodes[start].parent?;
        }
    }

    fn find_address(
        &self,
        index: NodeIndex,
        ignore: Option<NodeIndex>,
        target_addr: u32,
    ) -> Option<u32> {
        let node = &self.nodes[index];

        for &child in &node.children {
            if Some(child) == ignore {
                continue;
            }
            if let Some(found) = self.find_address(child, None, target_addr) {
                return Some(found);
            }
        }

        let base = node.region.address.value()?;
        if target_addr < base || target_addr - base >= node.region.len {
            return None;
        }
        let candidate = node.region.offset + (target_addr - base);

        // Children carve holes in the parent's address space, but only the
        // interior of a child occludes: a candidate sitting exactly on a
        // child's start offset still resolves through this region, which is
        // what keeps shared-start pyramids answerable.
        let swallowed = node.children.iter().any(|&c| {
            let child = &self.nodes[c].region;
            child.offset < candidate && candidate < child.end()
        });
        if swallowed {
            None
        } else {
            Some(candidate)
        }
    }

    /// True if `[offset, offset + length)` lies within a single node with no
    /// child carving into it.
    pub fn is_range_unbroken(&self, offset: u32, length: u32) -> bool {
        if length == 0 {
            return true;
        }
        let node = &self.nodes[self.node_at(offset)];
        let Some(end) = offset.checked_add(length) else {
            return false;
        };
        if end > node.region.end() {
            return false;
        }
        // node_at returned the deepest node containing `offset`, so any
        // overlapping child starts strictly inside the range.
        !node
            .children
            .iter()
            .any(|&c| self.nodes[c].region.offset < end && self.nodes[c].region.offset > offset)
    }

    /// All real (non-root) regions in pre-order, which equals region list
    /// order, with floating lengths resolved.
    pub fn resolved_regions(&self) -> Vec<ResolvedRegion> {
        let mut out = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        self.collect_resolved(0, &mut out);
        out
    }

    fn collect_resolved(&self, index: NodeIndex, out: &mut Vec<ResolvedRegion>) {
        if index != 0 {
            out.push(self.nodes[index].region);
        }
        for &child in &self.nodes[index].children {
            self.collect_resolved(child, out);
        }
    }
}
