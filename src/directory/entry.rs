//! Directory entry definitions
//!
//! `SlotRecord` is the raw 272-byte record exactly as stored on disk.
//! `Entry` is a validated, occupied slot.

use std::borrow::Cow;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::container::Container;
use crate::error::{Result, StegError};

use super::{ENTRY_SIZE, MAX_NAME_LEN};

// =============================================================================
// Raw Record
// =============================================================================

/// One directory slot as laid out on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    /// NUL-padded name; a zero first byte marks the slot free
    pub name: [u8; MAX_NAME_LEN],
    /// Payload size in bytes
    pub size: u64,
    /// Absolute byte offset of the payload in the container
    pub offset: u64,
}

impl SlotRecord {
    /// An all-zero (free) record
    pub fn free() -> Self {
        Self {
            name: [0u8; MAX_NAME_LEN],
            size: 0,
            offset: 0,
        }
    }

    /// Build a record from raw parts, copying at most `MAX_NAME_LEN` name bytes
    ///
    /// No validation is done: this can express records that a load would reject.
    pub fn new(name: &[u8], size: u64, offset: u64) -> Self {
        let mut field = [0u8; MAX_NAME_LEN];
        let len = name.len().min(MAX_NAME_LEN);
        field[..len].copy_from_slice(&name[..len]);
        Self {
            name: field,
            size,
            offset,
        }
    }

    /// True if the slot holds no entry
    pub fn is_free(&self) -> bool {
        self.name[0] == 0
    }

    /// Decode one record, consuming exactly `ENTRY_SIZE` bytes
    ///
    /// # Panics
    /// Panics if `buf` holds fewer than `ENTRY_SIZE` bytes.
    pub fn decode(buf: &mut impl Buf) -> Self {
        let mut name = [0u8; MAX_NAME_LEN];
        buf.copy_to_slice(&mut name);
        let size = buf.get_u64_le();
        let offset = buf.get_u64_le();
        Self { name, size, offset }
    }

    /// Append the record's `ENTRY_SIZE` bytes to `buf`
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.name);
        buf.put_u64_le(self.size);
        buf.put_u64_le(self.offset);
    }

    /// Encode into a standalone buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(ENTRY_SIZE);
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Validate an occupied record against the container bounds
    ///
    /// Returns `Ok(None)` for a free slot and `Err(reason)` for a record
    /// that must be discarded.
    pub(crate) fn to_entry(&self, container: &Container) -> std::result::Result<Option<Entry>, String> {
        if self.is_free() {
            return Ok(None);
        }

        let len = match self.name.iter().position(|&b| b == 0) {
            Some(len) => len,
            None => return Err(format!("name is not terminated within {} bytes", MAX_NAME_LEN)),
        };
        let name = self.name[..len].to_vec();

        if self.size == 0 {
            return Err(format!("'{}' has zero size", String::from_utf8_lossy(&name)));
        }

        if !container.contains(self.offset, self.size) {
            return Err(format!(
                "'{}' spans {}..{} outside data region {}..{}",
                String::from_utf8_lossy(&name),
                self.offset,
                self.offset.saturating_add(self.size),
                container.data_start,
                container.data_end()
            ));
        }

        Ok(Some(Entry {
            name,
            size: self.size,
            offset: self.offset,
        }))
    }
}

// =============================================================================
// Validated Entry
// =============================================================================

/// An occupied directory slot describing one stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Raw file name bytes (1..MAX_NAME_LEN bytes, no NUL)
    ///
    /// Names are not required to be UTF-8; containers written by other
    /// tools may use any single-byte encoding.
    pub name: Vec<u8>,
    /// Payload size in bytes (always > 0)
    pub size: u64,
    /// Absolute byte offset of the payload in the container
    pub offset: u64,
}

impl Entry {
    /// Check that `name` fits the on-disk name field
    pub fn validate_name(name: &[u8]) -> Result<()> {
        if name.is_empty() {
            return Err(StegError::InvalidName("name is empty".to_string()));
        }
        if name.len() >= MAX_NAME_LEN {
            return Err(StegError::InvalidName(format!(
                "name is {} bytes, limit is {}",
                name.len(),
                MAX_NAME_LEN - 1
            )));
        }
        if name.contains(&0) {
            return Err(StegError::InvalidName("name contains a NUL byte".to_string()));
        }
        Ok(())
    }

    /// Name for display, with invalid UTF-8 replaced
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// First byte past this entry's payload
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    /// On-disk form of this entry
    pub fn to_record(&self) -> SlotRecord {
        SlotRecord::new(&self.name, self.size, self.offset)
    }
}
