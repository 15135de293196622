//! # StegFS
//!
//! A flat, append-mostly file store hidden inside the pixel-data region
//! of a BMP image:
//! - Fixed-capacity directory of named entries at the start of the pixels
//! - Tolerant load: corrupt entries are dropped, not fatal
//! - High-water-mark allocation that never overlaps live data
//! - Whole-directory rewrite plus fsync after every mutation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Store                                 │
//! │          (create / read / delete / list handle)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼────────────────┐
//!          │            │                │
//!          ▼            ▼                ▼
//!   ┌─────────────┐ ┌───────────┐ ┌─────────────┐
//!   │  Directory  │ │ Allocator │ │  Persist    │
//!   │ (128 slots) │ │(high-water│ │(region I/O +│
//!   └──────┬──────┘ │   mark)   │ │   fsync)    │
//!          │        └───────────┘ └──────┬──────┘
//!          └───────────────┬─────────────┘
//!                          ▼
//!                  ┌───────────────┐
//!                  │   Container   │
//!                  │  (BMP file)   │
//!                  └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use stegfs::Store;
//!
//! let mut store = Store::open("cover.bmp")?;
//! store.create("note.txt", b"hello")?;
//! assert_eq!(&store.read("note.txt")?[..], b"hello");
//! store.close()?;
//! # Ok::<(), stegfs::StegError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod container;
pub mod directory;
pub mod allocator;
pub mod persist;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StegError};
pub use config::{StoreConfig, SyncMode};
pub use container::Container;
pub use directory::{Directory, Entry};
pub use store::{Store, Usage};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of StegFS
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
