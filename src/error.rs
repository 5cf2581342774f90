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

//! Error types for the address-map core.
//!
//! Structural operations never panic; every failure is a typed return value.
//! [`AddError`] variants are user-facing and surfaced to edit dialogs
//! verbatim, [`LoadError`] wraps failures while reconstructing a map from a
//! project file, and [`ConsistencyError`] reports internal invariant breaches
//! found by the cross-view validator.

use thiserror::Error;

/// Why a region could not be added to the map.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AddError {
    /// Offset, length, address, or file span fails its range check.
    /// Callers must treat this as a bug, not a user mistake.
    #[error("offset, length, or address is out of range")]
    InvalidValue,

    /// A region with the identical `(offset, length)` already exists.
    #[error("a region with the same start offset and length already exists")]
    OverlapExisting,

    /// Another region starts at the same offset and at least one of the two
    /// has a floating length.
    #[error("a floating-length region cannot share a start offset with another region")]
    OverlapFloating,

    /// The new region partially overlaps an existing region. Regions must be
    /// disjoint or fully nested.
    #[error("the region partially overlaps an existing region")]
    StraddleExisting,
}

/// Why a map could not be reconstructed from its flat entry form.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The declared file span is zero or larger than 16 MiB.
    #[error("file span {span:#x} is outside the supported range")]
    InvalidSpan {
        /// The rejected span.
        span: u32,
    },

    /// An entry was rejected by `add_region`. Any rejection during load is a
    /// hard error; project files are written from a valid map.
    #[error("entry {index}: {source}")]
    Entry {
        /// Position of the offending entry in the flat list.
        index: usize,
        /// The underlying rejection.
        source: AddError,
    },

    /// The map data did not parse.
    #[error("malformed map data: {0}")]
    Format(#[from] serde_json::Error),

    /// The map file could not be read or written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An internal invariant breach detected by the cross-view validator.
///
/// These are fatal defects in the core, not user errors. Each variant carries
/// enough context to locate the offending state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyError {
    /// Adjacent region list entries violate the sort order.
    #[error("region list out of order at index {index}")]
    ListOrder {
        /// Index of the second entry of the offending pair.
        index: usize,
    },

    /// Two region list entries partially overlap.
    #[error("regions at indices {first} and {second} partially overlap")]
    ListStraddle {
        /// Index of the earlier entry.
        first: usize,
        /// Index of the later entry.
        second: usize,
    },

    /// A region list entry extends outside the file span.
    #[error("region at index {index} lies outside the file span")]
    ListBounds {
        /// Index of the offending entry.
        index: usize,
    },

    /// The synthetic tree root does not cover exactly the file span.
    #[error("tree root covers {root_len:#x} bytes but the file span is {span:#x}")]
    RootSpan {
        /// Length covered by the root node.
        root_len: u32,
        /// Expected file span.
        span: u32,
    },

    /// The tree does not hold exactly one node per region list entry.
    #[error("tree holds {found} region nodes, region list holds {expected}")]
    TreeCount {
        /// Nodes found in the tree.
        found: usize,
        /// Entries in the region list.
        expected: usize,
    },

    /// A tree node does not structurally match its region list entry.
    #[error("tree node at offset {offset:#x} does not match its region list entry")]
    TreeMismatch {
        /// Start offset of the mismatched node.
        offset: u32,
    },

    /// A child node extends outside its parent.
    #[error("tree node at offset {offset:#x} escapes its parent")]
    NodeEscapesParent {
        /// Start offset of the escaping node.
        offset: u32,
    },

    /// Two children of the same parent overlap.
    #[error("overlapping children under the tree node at offset {offset:#x}")]
    ChildOverlap {
        /// Start offset of the parent node.
        offset: u32,
    },

    /// A resolved floating region has children.
    #[error("resolved floating region at offset {offset:#x} has children")]
    FloatingNotLeaf {
        /// Start offset of the floating node.
        offset: u32,
    },

    /// The change stream has the wrong number of events.
    #[error("change stream has {found} events, expected {expected}")]
    EventCount {
        /// Events found in the stream.
        found: usize,
        /// `2 * (regions + synthesized fillers)`.
        expected: usize,
    },

    /// An end event does not match the most recent unmatched start event.
    #[error("change stream nesting broken at event {index}")]
    EventNesting {
        /// Index of the offending event.
        index: usize,
    },

    /// The change stream does not cover the file span contiguously.
    #[error("change stream leaves a gap at offset {offset:#x}")]
    EventGap {
        /// First uncovered offset.
        offset: u32,
    },
}
