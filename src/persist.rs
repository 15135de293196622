//! Persistence Module
//!
//! Byte-range I/O against the container file.
//!
//! ## Responsibilities
//! - Load the directory region at open
//! - Rewrite the whole directory region after every mutation, followed
//!   by a durability barrier
//! - Exact-length payload reads and writes
//!
//! There is no write-ahead log: a crash during `persist` may leave a torn
//! directory (some slots old, some new).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::config::SyncMode;
use crate::container::Container;
use crate::directory::{Directory, METADATA_SIZE};
use crate::error::{Result, StegError};

/// Read and decode the directory region at `data_start`
pub fn load(file: &mut File, container: &Container) -> Result<Directory> {
    let mut region = vec![0u8; METADATA_SIZE];
    read_exact_at(file, container.data_start, &mut region)?;

    let directory = Directory::decode(&region, container)?;

    tracing::debug!(
        files = directory.count(),
        discarded = directory.discarded(),
        "Directory loaded"
    );

    Ok(directory)
}

/// Write all `MAX_FILES` slots to `data_start` and force them to stable storage
pub fn persist(
    file: &mut File,
    container: &Container,
    directory: &Directory,
    sync_mode: SyncMode,
) -> Result<()> {
    let region = directory.encode();

    write_all_at(file, container.data_start, &region)?;
    sync_mode.sync(file)?;

    tracing::debug!(
        offset = container.data_start,
        bytes = region.len(),
        files = directory.count(),
        "Directory persisted"
    );

    Ok(())
}

/// Fill `buf` from `offset`, failing with `ShortRead` at early EOF
pub fn read_exact_at(file: &mut File, offset: u64, buf: &mut [u8]) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;

    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if filled != buf.len() {
        return Err(StegError::ShortRead {
            expected: buf.len() as u64,
            actual: filled as u64,
        });
    }

    Ok(())
}

/// Write all of `data` at `offset`
pub fn write_all_at(file: &mut File, offset: u64, data: &[u8]) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(data)?;
    Ok(())
}
