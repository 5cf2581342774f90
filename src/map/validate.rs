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

//! Cross-view consistency checks.
//!
//! The region list is authoritative; the tree and the change stream are
//! derived from it. After every mutation the three views must agree. Debug
//! builds assert this at mutation return; tests and the fuzz harness call
//! the checks directly through `AddressMap::check_consistency`.

use super::changes::{ChangeKind, ChangeStream};
use super::region::{Region, RegionLen};
use super::tree::Tree;
use crate::error::ConsistencyError;

pub(crate) fn check(
    span_length: u32,
    regions: &[Region],
    tree: &Tree,
    changes: &ChangeStream,
) -> Result<(), ConsistencyError> {
    check_region_list(span_length, regions)?;
    check_tree(span_length, regions, tree)?;
    check_changes(span_length, regions, changes)
}

/// Ordering, bounds, and pairwise overlap invariants on the region list.
fn check_region_list(span_length: u32, regions: &[Region]) -> Result<(), ConsistencyError> {
    for (index, region) in regions.iter().enumerate() {
        let in_bounds = region.offset < span_length
            && match region.end() {
                Some(end) => end <= span_length && region.len != RegionLen::Fixed(0),
                None => true,
            };
        if !in_bounds {
            return Err(ConsistencyError::ListBounds { index });
        }
    }

    for (index, pair) in regions.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        let ordered = a.offset < b.offset
            || (a.offset == b.offset
                && match (a.len.fixed(), b.len.fixed()) {
                    (Some(a_len), Some(b_len)) => a_len > b_len,
                    // Same offset with a floating entry is always a breach.
                    _ => false,
                });
        if !ordered {
            return Err(ConsistencyError::ListOrder { index: index + 1 });
        }
    }

    // Any entry starting inside an earlier fixed-length entry must end
    // inside it too. Floating entries end before the next entry starts, so
    // they cannot straddle anything.
    for (first, a) in regions.iter().enumerate() {
        let Some(a_end) = a.end() else { continue };
        for (second, b) in regions.iter().enumerate().skip(first + 1) {
            if b.offset >= a_end {
                break;
            }
            if let Some(b_end) = b.end() {
                if b_end > a_end {
                    return Err(ConsistencyError::ListStraddle { first, second });
                }
            }
        }
    }
    Ok(())
}

/// The tree mirrors the region list exactly, with floating lengths resolved
/// and every node inside its parent.
fn check_tree(span_length: u32, regions: &[Region], tree: &Tree) -> Result<(), ConsistencyError> {
    let root = tree.root_region();
    if root.offset != 0 || root.len != span_length || root.address.is_addressable() {
        return Err(ConsistencyError::RootSpan {
            root_len: root.len,
            span: span_length,
        });
    }

    // Pre-order over the tree equals region list order.
    let resolved = tree.resolved_regions();
    if resolved.len() != regions.len() {
        return Err(ConsistencyError::TreeCount {
            found: resolved.len(),
            expected: regions.len(),
        });
    }
    for (node, entry) in resolved.iter().zip(regions) {
        let matches = node.offset == entry.offset
            && match entry.len {
                RegionLen::Fixed(len) => !node.was_floating && node.len == len,
                RegionLen::Floating => node.was_floating,
            }
            && node.address == entry.address
            && node.is_relative == entry.is_relative;
        if !matches {
            return Err(ConsistencyError::TreeMismatch {
                offset: node.offset,
            });
        }
    }

    check_node(tree, 0)
}

fn check_node(tree: &Tree, index: usize) -> Result<(), ConsistencyError> {
    let node = tree.node(index);
    if node.region.was_floating && !node.children.is_empty() {
        return Err(ConsistencyError::FloatingNotLeaf {
            offset: node.region.offset,
        });
    }

    let mut cursor = node.region.offset;
    for &child_index in &node.children {
        let child = &tree.node(child_index).region;
        if child.offset < node.region.offset
            || child.len == 0
            || child.end() > node.region.end()
        {
            return Err(ConsistencyError::NodeEscapesParent {
                offset: child.offset,
            });
        }
        if child.offset < cursor {
            return Err(ConsistencyError::ChildOverlap {
                offset: node.region.offset,
            });
        }
        cursor = child.end();
        check_node(tree, child_index)?;
    }
    Ok(())
}

/// Event cardinality, nesting, and contiguous top-level coverage.
fn check_changes(
    span_length: u32,
    regions: &[Region],
    changes: &ChangeStream,
) -> Result<(), ConsistencyError> {
    let expected = 2 * (regions.len() + changes.filler_count());
    if changes.len() != expected {
        return Err(ConsistencyError::EventCount {
            found: changes.len(),
            expected,
        });
    }

    let mut stack = Vec::new();
    let mut cursor = 0;
    for (index, event) in changes.iter().enumerate() {
        match event.kind {
            ChangeKind::Start => {
                if stack.is_empty() && event.offset != cursor {
                    return Err(ConsistencyError::EventGap { offset: cursor });
                }
                stack.push(event.region);
            }
            ChangeKind::End => {
                if stack.pop() != Some(event.region) {
                    return Err(ConsistencyError::EventNesting { index });
                }
                if stack.is_empty() {
                    cursor = event.offset;
                }
            }
        }
    }
    if !stack.is_empty() {
        return Err(ConsistencyError::EventNesting {
            index: changes.len(),
        });
    }
    if cursor != span_length {
        return Err(ConsistencyError::EventGap { offset: cursor });
    }
    Ok(())
}
