//! Filesystem driver set
//!
//! The three external drivers the coordinator dispatches to, plus the
//! cache geometry every mount is issued with.

use diskdock_core::FilesystemDriver;

/// Cache pages handed to every driver mount.
pub const CACHE_PAGES: u32 = 8;

/// Sectors per cache page handed to every driver mount.
pub const SECTORS_PER_PAGE: u32 = 64;

/// The filesystem drivers available to one device.
///
/// Unmount tears a name down through all three drivers unconditionally,
/// so each driver must tolerate names it does not own.
pub struct DriverSet {
    pub fat: Box<dyn FilesystemDriver>,
    pub ntfs: Box<dyn FilesystemDriver>,
    pub ext2: Box<dyn FilesystemDriver>,
}

impl DriverSet {
    pub fn new(
        fat: Box<dyn FilesystemDriver>,
        ntfs: Box<dyn FilesystemDriver>,
        ext2: Box<dyn FilesystemDriver>,
    ) -> Self {
        Self { fat, ntfs, ext2 }
    }
}
