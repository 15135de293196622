//! Store Module
//!
//! The open store handle that coordinates all components.
//!
//! ## Responsibilities
//! - Validate the container and load the directory on open
//! - Create, read, delete and list entries
//! - Persist the directory after every mutation before reporting success
//! - Roll the in-memory directory back when a mutation fails

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::allocator;
use crate::config::StoreConfig;
use crate::container::Container;
use crate::directory::{Directory, Entry, MAX_FILES};
use crate::error::{Result, StegError};
use crate::persist;

/// Space accounting for an open store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Start of the data region (directory offset)
    pub data_start: u64,
    /// Size of the data region, directory included
    pub data_size: u64,
    /// First byte available to payloads
    pub payload_start: u64,
    /// Next offset the allocator will hand out
    pub high_water: u64,
    /// Bytes left between the high-water mark and the end of the region
    pub free_bytes: u64,
    /// Occupied slots
    pub file_count: usize,
    /// Total slots
    pub capacity: usize,
}

/// An open store backed by a single container file
///
/// ## Ownership:
/// - Exclusively owns the file handle; it is released once, when the
///   store is closed or dropped
/// - No locking: one store per container at a time. Two stores on the
///   same file race and the last persist wins
pub struct Store {
    /// Container file handle
    file: File,

    /// Path the store was opened from
    path: PathBuf,

    /// Data region location
    container: Container,

    /// In-memory copy of the directory region
    directory: Directory,

    /// Highest end offset handed out or loaded this session
    high_water: u64,

    /// Store configuration
    config: StoreConfig,
}

impl Store {
    /// Open a store with default config
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreConfig::default())
    }

    /// Open a store
    ///
    /// On open:
    /// 1. Open and validate the container
    /// 2. Load the directory, discarding invalid slots
    /// 3. Seed the high-water mark from the live entries
    pub fn open_with(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let path = path.as_ref();

        if config.max_read_size == 0 {
            return Err(StegError::Config("max_read_size must be at least 1 byte".to_string()));
        }

        let (mut file, container) = Container::open(path, config.read_only)?;
        let directory = persist::load(&mut file, &container)?;
        let high_water = allocator::high_water(&container, &directory, 0);

        tracing::info!(
            path = %path.display(),
            data_start = container.data_start,
            data_size = container.data_size,
            files = directory.count(),
            "Store opened"
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            container,
            directory,
            high_water,
            config,
        })
    }

    /// Store `data` under `name`
    ///
    /// Steps:
    /// 1. Reject duplicates, bad names and empty payloads
    /// 2. Allocate past the high-water mark
    /// 3. Check for a free slot
    /// 4. Write the payload, record the entry, persist the directory
    pub fn create(&mut self, name: impl AsRef<[u8]>, data: &[u8]) -> Result<Entry> {
        let name = name.as_ref();
        self.check_writable()?;
        Entry::validate_name(name)?;

        if data.is_empty() {
            return Err(StegError::EmptyFile(lossy(name)));
        }

        if self.directory.find(name).is_some() {
            return Err(StegError::AlreadyExists(lossy(name)));
        }

        let size = data.len() as u64;
        let offset = allocator::allocate(&self.container, &self.directory, self.high_water, size)?;

        if self.directory.is_full() {
            return Err(StegError::DirectoryFull { capacity: MAX_FILES });
        }

        persist::write_all_at(&mut self.file, offset, data)?;

        let entry = Entry {
            name: name.to_vec(),
            size,
            offset,
        };
        let index = self.directory.insert(entry.clone())?;

        if let Err(e) = self.persist() {
            self.directory.remove(index);
            return Err(e);
        }

        self.high_water = self.high_water.max(entry.end());

        tracing::info!(name = %entry.display_name(), size, offset, slot = index, "File created");
        Ok(entry)
    }

    /// Read the full contents of `name`
    pub fn read(&mut self, name: impl AsRef<[u8]>) -> Result<Bytes> {
        let entry = self.lookup(name)?.clone();
        let len = self.read_len(&entry)?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| StegError::OutOfMemory { requested: entry.size })?;
        buf.resize(len, 0);

        persist::read_exact_at(&mut self.file, entry.offset, &mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Stream the contents of `name` into `writer`, returning the byte count
    pub fn read_into(&mut self, name: impl AsRef<[u8]>, writer: &mut impl Write) -> Result<u64> {
        let entry = self.lookup(name)?.clone();

        self.file.seek(SeekFrom::Start(entry.offset))?;
        let copied = io::copy(&mut (&mut self.file).take(entry.size), writer)?;

        if copied != entry.size {
            return Err(StegError::ShortRead {
                expected: entry.size,
                actual: copied,
            });
        }

        Ok(copied)
    }

    /// Remove `name` from the directory
    ///
    /// The payload bytes stay in the container, unreferenced. Their space
    /// is not reused.
    pub fn delete(&mut self, name: impl AsRef<[u8]>) -> Result<Entry> {
        let name = name.as_ref();
        self.check_writable()?;

        let index = self
            .directory
            .find(name)
            .ok_or_else(|| StegError::FileNotFound(lossy(name)))?;

        let entry = match self.directory.remove(index) {
            Some(entry) => entry,
            None => return Err(StegError::FileNotFound(lossy(name))),
        };

        if let Err(e) = self.persist() {
            self.directory.restore(index, entry);
            return Err(e);
        }

        tracing::info!(name = %entry.display_name(), size = entry.size, slot = index, "File deleted");
        Ok(entry)
    }

    /// Name and size of every stored file, in slot order
    ///
    /// Names that are not UTF-8 are shown lossily; use `entries` for raw bytes.
    pub fn list(&self) -> Vec<(String, u64)> {
        self.directory
            .iter()
            .map(|entry| (entry.display_name().into_owned(), entry.size))
            .collect()
    }

    /// Every stored entry, in slot order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.directory.iter()
    }

    /// Directory entry for `name`
    pub fn stat(&self, name: impl AsRef<[u8]>) -> Option<&Entry> {
        self.directory.get(name)
    }

    /// CRC32 of the contents of `name`
    pub fn checksum(&mut self, name: impl AsRef<[u8]>) -> Result<u32> {
        let data = self.read(name)?;
        Ok(crc32fast::hash(&data))
    }

    /// Space accounting
    pub fn usage(&self) -> Usage {
        let high_water = allocator::high_water(&self.container, &self.directory, self.high_water);

        Usage {
            data_start: self.container.data_start,
            data_size: self.container.data_size,
            payload_start: self.container.payload_start(),
            high_water,
            free_bytes: self.container.data_end().saturating_sub(high_water),
            file_count: self.directory.count(),
            capacity: self.directory.capacity(),
        }
    }

    /// Close the store, issuing a final durability barrier
    ///
    /// Dropping the store also releases the handle, without the barrier.
    pub fn close(self) -> Result<()> {
        if !self.config.read_only {
            self.config.sync_mode.sync(&self.file)?;
        }

        tracing::debug!(path = %self.path.display(), "Store closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Path the store was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validated container geometry
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// In-memory directory
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Number of stored files
    pub fn file_count(&self) -> usize {
        self.directory.count()
    }

    /// Store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn persist(&mut self) -> Result<()> {
        persist::persist(
            &mut self.file,
            &self.container,
            &self.directory,
            self.config.sync_mode,
        )
    }

    fn check_writable(&self) -> Result<()> {
        if self.config.read_only {
            return Err(StegError::ReadOnly);
        }
        Ok(())
    }

    fn lookup(&self, name: impl AsRef<[u8]>) -> Result<&Entry> {
        let name = name.as_ref();
        self.directory
            .get(name)
            .ok_or_else(|| StegError::FileNotFound(lossy(name)))
    }

    /// Buffer length for reading `entry`, bounded by `max_read_size`
    fn read_len(&self, entry: &Entry) -> Result<usize> {
        if entry.size > self.config.max_read_size {
            return Err(StegError::OutOfMemory { requested: entry.size });
        }
        usize::try_from(entry.size).map_err(|_| StegError::OutOfMemory { requested: entry.size })
    }
}

/// Lossy rendering of a raw name for error messages
fn lossy(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}
