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

//! Mamba65 Address-Map Core
//!
//! This library implements the address-map core of a 6502/65816
//! disassembler: the data structure that binds file byte-offsets (the linear
//! layout of an on-disk image) to CPU addresses (the logical addresses the
//! code executed under). Overlays, bank switching, and loader headers
//! produce overlapping, nested, and floating-length regions; the map keeps
//! three views of them coherent under incremental edits.
//!
//! # Modules
//!
//! - [`error`] - Typed error taxonomy for all operations
//! - [`map`] - The address map, its region list, tree, and change stream
//! - [`project`] - Flat-entry JSON serialization for project files
//!
//! # Example
//!
//! ```
//! use mamba65::{Address, AddressMap, ChangeKind, RegionLen};
//!
//! let mut map = AddressMap::new(0x10000)?;
//!
//! // A two-byte loader header with no CPU address, then code at $0801.
//! map.add_region(0x0000, RegionLen::Fixed(2), Address::NonAddressable, false)?;
//! map.add_region(0x0002, RegionLen::Floating, Address::Addressable(0x0801), false)?;
//!
//! assert_eq!(map.offset_to_address(0x0000), Address::NonAddressable);
//! assert_eq!(map.offset_to_address(0x0012), Address::Addressable(0x0811));
//! assert_eq!(map.address_to_offset(0x0012, 0x0801), Some(0x0002));
//!
//! // Code generation walks the change stream in offset order.
//! for event in map.change_stream() {
//!     if event.kind == ChangeKind::Start {
//!         println!("org {} at +{:06x}", event.address, event.offset);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod map;
pub mod project;

// Re-export commonly used types
pub use error::{AddError, ConsistencyError, LoadError};
pub use map::changes::{ChangeEvent, ChangeKind, ChangeStream, RegionId, StreamRegion};
pub use map::region::{
    Address, Region, RegionLen, ResolvedRegion, ADDR_MAX, FLOATING_LEN, NON_ADDR, OFFSET_MAX,
    SPAN_MAX,
};
pub use map::AddressMap;
pub use project::{load_map, save_map};

/// The version of the Mamba65 core.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the project.
pub const NAME: &str = "Mamba65";
