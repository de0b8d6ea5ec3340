//! diskdock error types

use crate::types::FsKind;
use thiserror::Error;

/// The main error type for diskdock operations
#[derive(Error, Debug)]
pub enum Error {
    /// A sector read failed and the surrounding operation could not continue
    #[error("device read failed: {count} sector(s) at LBA {lba}")]
    DeviceRead { lba: u64, count: usize },

    /// Invalid or corrupted partition table structure
    #[error("invalid partition table: {0}")]
    InvalidTable(String),

    /// A table parse completed but produced no usable partition entries
    #[error("partition table contains no usable entries")]
    EmptyTable,

    /// A registry index outside the current record count
    #[error("no partition at index {0}")]
    BadIndex(usize),

    /// Mount names must be non-empty
    #[error("invalid mount name")]
    InvalidMountName,

    /// The partition's filesystem label has no driver mapping
    #[error("no driver for {0} partitions")]
    NoDriver(FsKind),

    /// The selected driver rejected the mount
    #[error("driver rejected mount of {fs} partition {index}")]
    MountFailed { index: usize, fs: FsKind },

    /// I/O error from the host filesystem (image files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for diskdock operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid partition table error
    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Error::InvalidTable(msg.into())
    }

    /// Create a device read error
    pub fn device_read(lba: u64, count: usize) -> Self {
        Error::DeviceRead { lba, count }
    }
}
