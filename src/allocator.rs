//! Allocator Module
//!
//! High-water-mark allocation over the payload space.
//!
//! New entries are always placed past the highest end offset of any live
//! entry (and past the caller-supplied floor). Space vacated by deletion is
//! never reused, so there is no free list and nothing to compact.

use crate::container::Container;
use crate::directory::Directory;
use crate::error::{Result, StegError};

/// Highest end offset over all live entries, never below `floor` or the
/// first payload byte
pub fn high_water(container: &Container, directory: &Directory, floor: u64) -> u64 {
    directory
        .iter()
        .map(|entry| entry.end())
        .fold(container.payload_start().max(floor), u64::max)
}

/// Offset at which a new entry of `size` bytes may be written
///
/// `floor` lets the caller keep allocation monotonic across deletions of
/// the highest entry. Fails with `InsufficientSpace` if the entry would run
/// past the end of the data region.
pub fn allocate(container: &Container, directory: &Directory, floor: u64, size: u64) -> Result<u64> {
    let offset = high_water(container, directory, floor);
    let available = container.data_end().saturating_sub(offset);

    if size > available {
        return Err(StegError::InsufficientSpace {
            needed: size,
            available,
        });
    }

    Ok(offset)
}
