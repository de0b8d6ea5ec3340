//! Concrete block devices backed by images
//!
//! Real deployments hand diskdock a hardware-backed [`BlockDevice`]; these
//! two implementations cover disk images, which is also what every test in
//! the workspace runs against.

use crate::{BlockDevice, SECTOR_SIZE};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// In-memory block device over a byte buffer.
///
/// The buffer is treated as a raw sector image. Startup and insertion state
/// are controllable so callers can exercise the offline paths.
///
/// # Example
///
/// ```rust
/// use diskdock_core::{BlockDevice, MemDevice, SECTOR_SIZE};
///
/// let mut device = MemDevice::new(vec![0xABu8; SECTOR_SIZE * 4]);
/// let mut buf = [0u8; SECTOR_SIZE];
/// assert!(device.read_sectors(2, 1, &mut buf));
/// assert_eq!(buf[0], 0xAB);
/// ```
#[derive(Debug, Clone)]
pub struct MemDevice {
    data: Vec<u8>,
    starts_up: bool,
    inserted: bool,
    started: bool,
}

impl MemDevice {
    /// Create a device over `data`, powered off but insertable.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            starts_up: true,
            inserted: true,
            started: false,
        }
    }

    /// Make `startup` fail, simulating a dead device.
    pub fn failing_startup(mut self) -> Self {
        self.starts_up = false;
        self
    }

    /// Make `is_inserted` report no medium.
    pub fn ejected(mut self) -> Self {
        self.inserted = false;
        self
    }

    /// Whether `startup` has been called successfully.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl BlockDevice for MemDevice {
    fn startup(&mut self) -> bool {
        if !self.starts_up {
            return false;
        }
        self.started = true;
        true
    }

    fn is_inserted(&self) -> bool {
        self.inserted
    }

    fn read_sectors(&mut self, lba: u64, count: usize, out: &mut [u8]) -> bool {
        let len = count * SECTOR_SIZE;
        if out.len() < len {
            return false;
        }
        let start = match (lba as usize).checked_mul(SECTOR_SIZE) {
            Some(s) => s,
            None => return false,
        };
        let end = match start.checked_add(len) {
            Some(e) => e,
            None => return false,
        };
        if end > self.data.len() {
            return false;
        }
        out[..len].copy_from_slice(&self.data[start..end]);
        true
    }

    fn shutdown(&mut self) {
        self.started = false;
    }
}

/// Block device over a disk-image file.
///
/// Reads past the end of the image fail like reads past the end of a
/// physical disk.
pub struct FileDevice {
    file: File,
    sectors: u64,
}

impl FileDevice {
    /// Open a raw sector image.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its size queried.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let sectors = file.metadata()?.len() / SECTOR_SIZE as u64;
        Ok(Self { file, sectors })
    }

    /// Device capacity in whole sectors.
    pub fn sector_count(&self) -> u64 {
        self.sectors
    }
}

impl BlockDevice for FileDevice {
    fn startup(&mut self) -> bool {
        true
    }

    fn is_inserted(&self) -> bool {
        self.sectors > 0
    }

    fn read_sectors(&mut self, lba: u64, count: usize, out: &mut [u8]) -> bool {
        let len = count * SECTOR_SIZE;
        if out.len() < len || lba + count as u64 > self.sectors {
            return false;
        }
        if self
            .file
            .seek(SeekFrom::Start(lba * SECTOR_SIZE as u64))
            .is_err()
        {
            return false;
        }
        self.file.read_exact(&mut out[..len]).is_ok()
    }

    fn shutdown(&mut self) {}
}
