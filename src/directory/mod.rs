//! Directory Module
//!
//! Fixed-capacity table of named entries stored at the start of the
//! container's data region.
//!
//! ## Responsibilities
//! - Encode/decode the on-disk record layout
//! - Validate each slot independently on load (tolerant load)
//! - Track which byte ranges of the data region are in use
//!
//! ## Record Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Slot 0 (272 bytes)                                      │
//! │   Name (256, NUL-padded) | Size: u64 LE | Offset: u64 LE│
//! ├─────────────────────────────────────────────────────────┤
//! │ Slot 1 ... Slot 127                                     │
//! │   (first name byte == 0 means the slot is free)         │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod entry;
mod table;

pub use entry::{Entry, SlotRecord};
pub use table::Directory;

// =============================================================================
// Shared Constants (used by entry, table, container, persist)
// =============================================================================

/// Width of the name field; names hold at most `MAX_NAME_LEN - 1` bytes
pub const MAX_NAME_LEN: usize = 256;

/// Number of slots in the directory
pub const MAX_FILES: usize = 128;

/// Record size: Name (256) + Size (8) + Offset (8) = 272 bytes
pub const ENTRY_SIZE: usize = MAX_NAME_LEN + 8 + 8;

/// Size of the whole directory region
pub const METADATA_SIZE: usize = MAX_FILES * ENTRY_SIZE;
