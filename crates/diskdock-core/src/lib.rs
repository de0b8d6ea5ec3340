//! # diskdock Core
//!
//! Core traits, types, and error handling for diskdock.
//!
//! This crate provides the foundational abstractions for partition discovery
//! and mount management on raw block devices:
//! - **BlockDevice**: the consumed sector-level device interface
//! - **FilesystemDriver**: the consumed per-filesystem mount/unmount interface
//! - **PartitionRecord** / **FsKind**: the discovery data model
//! - **MemDevice** / **FileDevice**: concrete block devices for images
//!
//! ## Example
//!
//! ```rust
//! use diskdock_core::{BlockDevice, MemDevice};
//!
//! let mut device = MemDevice::new(vec![0u8; 512 * 64]);
//! assert!(device.startup());
//! assert!(device.is_inserted());
//! ```

pub mod device;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use device::{FileDevice, MemDevice};
pub use error::{Error, Result};
pub use traits::{mount_flags, BlockDevice, FilesystemDriver};
pub use types::{FsKind, PartitionRecord};

/// Sector size assumed throughout; every consumed on-disk format is specified
/// in 512-byte sectors.
pub const SECTOR_SIZE: usize = 512;
