//! Directory table
//!
//! Fixed-length array of `MAX_FILES` slots with a derived occupied count.

use bytes::{Bytes, BytesMut};

use crate::container::Container;
use crate::error::{Result, StegError};

use super::{Entry, SlotRecord, ENTRY_SIZE, MAX_FILES, METADATA_SIZE};

/// In-memory copy of the directory region
///
/// The on-disk region is authoritative; this copy is rewritten to it
/// wholesale after every mutation.
#[derive(Debug, Clone)]
pub struct Directory {
    /// Slot array, `None` for free slots
    slots: [Option<Entry>; MAX_FILES],
    /// Number of occupied slots
    count: usize,
    /// Slots discarded as invalid when this directory was decoded
    discarded: usize,
}

impl Directory {
    /// Create an empty directory (all slots free)
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            count: 0,
            discarded: 0,
        }
    }

    /// Decode the directory region, validating each slot independently
    ///
    /// Invalid slots are treated as free and logged; they never fail the
    /// load. Only the first `METADATA_SIZE` bytes of `region` are read.
    pub fn decode(mut region: &[u8], container: &Container) -> Result<Self> {
        if region.len() < METADATA_SIZE {
            return Err(StegError::ShortRead {
                expected: METADATA_SIZE as u64,
                actual: region.len() as u64,
            });
        }

        let mut directory = Self::new();

        for (index, slot) in directory.slots.iter_mut().enumerate() {
            let record = SlotRecord::decode(&mut region);

            match record.to_entry(container) {
                Ok(Some(entry)) => {
                    tracing::debug!(
                        slot = index,
                        name = %entry.display_name(),
                        size = entry.size,
                        offset = entry.offset,
                        "Loaded entry"
                    );
                    *slot = Some(entry);
                    directory.count += 1;
                }
                Ok(None) => {}
                Err(reason) => {
                    tracing::warn!(slot = index, %reason, "Ignoring invalid directory entry");
                    directory.discarded += 1;
                }
            }
        }

        Ok(directory)
    }

    /// Encode all slots in order, free slots as all-zero records
    ///
    /// The result is always exactly `METADATA_SIZE` bytes.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(METADATA_SIZE);
        let free = SlotRecord::free();

        for slot in &self.slots {
            match slot {
                Some(entry) => entry.to_record().encode(&mut buf),
                None => free.encode(&mut buf),
            }
        }

        debug_assert_eq!(buf.len(), MAX_FILES * ENTRY_SIZE);
        buf.freeze()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Slot index of the entry named `name` (exact, case-sensitive)
    pub fn find(&self, name: impl AsRef<[u8]>) -> Option<usize> {
        let name = name.as_ref();
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(entry) if entry.name == name))
    }

    /// Entry named `name`
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&Entry> {
        self.find(name).and_then(|index| self.slots[index].as_ref())
    }

    /// Entry in slot `index`, if occupied
    pub fn slot(&self, index: usize) -> Option<&Entry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Index of the first free slot
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Occupied entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.slots.iter().flatten()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Place `entry` in the first free slot and return that slot's index
    pub fn insert(&mut self, entry: Entry) -> Result<usize> {
        let index = self
            .first_free()
            .ok_or(StegError::DirectoryFull { capacity: MAX_FILES })?;

        self.slots[index] = Some(entry);
        self.count += 1;
        Ok(index)
    }

    /// Clear slot `index`, returning the entry it held
    pub fn remove(&mut self, index: usize) -> Option<Entry> {
        let entry = self.slots.get_mut(index)?.take()?;
        self.count -= 1;
        Some(entry)
    }

    /// Put `entry` back into slot `index` (undo of `remove`)
    ///
    /// # Panics
    /// Panics if `index >= MAX_FILES`.
    pub fn restore(&mut self, index: usize, entry: Entry) {
        if self.slots[index].replace(entry).is_none() {
            self.count += 1;
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of occupied slots
    pub fn count(&self) -> usize {
        self.count
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        MAX_FILES
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == MAX_FILES
    }

    /// Number of slots rejected by validation during decode
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}
