//! Container Module
//!
//! Validates the BMP host file and locates its data region.
//!
//! Only two things about the image are ever interpreted: the magic at
//! offset 0 and the pixel-array offset at offset 10. Pixels are opaque.
//!
//! ## Host Layout
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ BMP Header (54 bytes)                                    │
//! │   Magic "BM" (2) | ... | DataStart: u32 LE @ offset 10   │
//! ├──────────────────────────────────────────────────────────┤
//! │ Data Region (data_start .. EOF)                          │
//! │   Directory (METADATA_SIZE) | Payload bytes ...          │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::directory::METADATA_SIZE;
use crate::error::{Result, StegError};

/// Size of the fixed BMP header read at open
pub const BMP_HEADER_SIZE: usize = 54;

/// Magic signature of a BMP file
pub const MAGIC: &[u8; 2] = b"BM";

/// Header offset of the little-endian u32 pixel-array offset
pub const DATA_OFFSET_FIELD: usize = 10;

/// Lowest pixel-array offset that leaves the magic and offset field intact
pub const MIN_DATA_START: u64 = DATA_OFFSET_FIELD as u64 + 4;

/// Size of the BITMAPINFOHEADER written by `create_carrier`
const DIB_HEADER_SIZE: u32 = 40;

/// 72 DPI expressed in pixels per metre
const PIXELS_PER_METRE: i32 = 2835;

/// Location of the data region inside a validated container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    /// Byte offset of the pixel array (start of the directory)
    pub data_start: u64,
    /// Bytes from `data_start` to end of file
    pub data_size: u64,
}

impl Container {
    /// Open the container at `path` and validate it
    ///
    /// Opens read-write unless `read_only` is set. Open failures are
    /// translated into `ContainerNotFound` / `PermissionDenied`.
    pub fn open(path: &Path, read_only: bool) -> Result<(File, Self)> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(!read_only)
            .open(path)
            .map_err(|e| StegError::from_open(e, path))?;

        let container = Self::validate(&mut file)?;
        Ok((file, container))
    }

    /// Validate an already-open container
    ///
    /// 1. Read the fixed header (short ⇒ `TruncatedHeader`)
    /// 2. Check the magic (mismatch ⇒ `InvalidFormat`)
    /// 3. Extract `data_start` and derive `data_size` from the file length
    /// 4. Require room for the directory plus at least one payload byte
    pub fn validate(file: &mut File) -> Result<Self> {
        file.seek(SeekFrom::Start(0))?;

        let mut header = Vec::with_capacity(BMP_HEADER_SIZE);
        Read::by_ref(file)
            .take(BMP_HEADER_SIZE as u64)
            .read_to_end(&mut header)?;

        if header.len() != BMP_HEADER_SIZE {
            return Err(StegError::TruncatedHeader {
                expected: BMP_HEADER_SIZE,
                actual: header.len(),
            });
        }

        if &header[0..2] != MAGIC {
            return Err(StegError::InvalidFormat(format!(
                "bad magic: expected \"BM\", got {:?}",
                &header[0..2]
            )));
        }

        let mut field = [0u8; 4];
        field.copy_from_slice(&header[DATA_OFFSET_FIELD..DATA_OFFSET_FIELD + 4]);
        let data_start = u64::from(u32::from_le_bytes(field));

        // The directory must not overwrite the magic or this offset field.
        // Smaller DIB headers (BITMAPCOREHEADER, offset 26) are fine.
        if data_start < MIN_DATA_START {
            return Err(StegError::InvalidFormat(format!(
                "pixel data offset {} overlaps the file header (minimum {})",
                data_start, MIN_DATA_START
            )));
        }

        let file_len = file.seek(SeekFrom::End(0))?;
        let data_size = file_len.saturating_sub(data_start);

        if data_size <= METADATA_SIZE as u64 {
            return Err(StegError::InsufficientSpace {
                needed: METADATA_SIZE as u64 + 1,
                available: data_size,
            });
        }

        tracing::debug!(data_start, data_size, "Container validated");

        Ok(Self {
            data_start,
            data_size,
        })
    }

    /// First byte past the data region
    pub fn data_end(&self) -> u64 {
        self.data_start + self.data_size
    }

    /// First byte past the directory region (start of payload space)
    pub fn payload_start(&self) -> u64 {
        self.data_start + METADATA_SIZE as u64
    }

    /// True if `[offset, offset + size)` lies entirely within the data region
    pub fn contains(&self, offset: u64, size: u64) -> bool {
        match offset.checked_add(size) {
            Some(end) => offset >= self.data_start && end <= self.data_end(),
            None => false,
        }
    }
}

// =============================================================================
// Carrier Creation
// =============================================================================

/// Bytes per pixel row of a 24-bit image, padded to a 4-byte boundary
fn row_stride(width: u32) -> u64 {
    (u64::from(width) * 24).div_ceil(32) * 4
}

/// Payload bytes a blank `width`×`height` carrier offers after the directory
///
/// Returns 0 when the pixel array cannot even hold the directory.
pub fn capacity_for(width: u32, height: u32) -> u64 {
    let pixels = row_stride(width) * u64::from(height);
    pixels.saturating_sub(METADATA_SIZE as u64)
}

/// Write a blank 24-bit uncompressed BMP usable as a fresh container
///
/// Fails with `Config` if the pixel array would not leave room for at
/// least one payload byte, or if the image would exceed the 4 GiB BMP limit.
pub fn create_carrier(path: &Path, width: u32, height: u32) -> Result<Container> {
    if capacity_for(width, height) == 0 {
        return Err(StegError::Config(format!(
            "{}x{} image is too small: pixel data must exceed {} bytes",
            width, height, METADATA_SIZE
        )));
    }

    let image_size = row_stride(width) * u64::from(height);
    let file_size = BMP_HEADER_SIZE as u64 + image_size;
    let (file_size, image_size) = match (u32::try_from(file_size), u32::try_from(image_size)) {
        (Ok(f), Ok(i)) => (f, i),
        _ => {
            return Err(StegError::Config(format!(
                "{}x{} image exceeds the 4 GiB BMP limit",
                width, height
            )))
        }
    };
    let (signed_width, signed_height) = match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(StegError::Config("image dimensions out of range".to_string())),
    };

    let mut header = Vec::with_capacity(BMP_HEADER_SIZE);

    // File header (14 bytes)
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&file_size.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes()); // Reserved
    header.extend_from_slice(&(BMP_HEADER_SIZE as u32).to_le_bytes());

    // BITMAPINFOHEADER (40 bytes)
    header.extend_from_slice(&DIB_HEADER_SIZE.to_le_bytes());
    header.extend_from_slice(&signed_width.to_le_bytes());
    header.extend_from_slice(&signed_height.to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes()); // Planes
    header.extend_from_slice(&24u16.to_le_bytes()); // Bits per pixel
    header.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    header.extend_from_slice(&image_size.to_le_bytes());
    header.extend_from_slice(&PIXELS_PER_METRE.to_le_bytes());
    header.extend_from_slice(&PIXELS_PER_METRE.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes()); // Palette colors
    header.extend_from_slice(&0u32.to_le_bytes()); // Important colors

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| StegError::from_open(e, path))?;

    file.write_all(&header)?;
    // Zero-filled pixels: a black image, and an all-free directory
    file.set_len(u64::from(file_size))?;
    file.sync_all()?;

    tracing::info!(
        path = %path.display(),
        width,
        height,
        file_size,
        "Created carrier image"
    );

    Ok(Container {
        data_start: BMP_HEADER_SIZE as u64,
        data_size: u64::from(image_size),
    })
}
