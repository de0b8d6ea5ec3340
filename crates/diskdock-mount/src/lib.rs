//! # diskdock Mount
//!
//! Partition registry and mount lifecycle for diskdock.
//!
//! [`MountManager`] binds one block device for its whole lifetime: it
//! starts the device up, discovers its partitions, hands mount and unmount
//! requests to the matching filesystem driver, and on drop releases every
//! mount before shutting the device down.
//!
//! ## Example
//!
//! ```rust,ignore
//! use diskdock_mount::{DriverSet, MountManager};
//!
//! let drivers = DriverSet::new(fat_driver, ntfs_driver, ext2_driver);
//! let mut manager = MountManager::new(device, drivers);
//! for (i, record) in manager.records().iter().enumerate() {
//!     println!("{i}: {record}");
//! }
//! manager.mount(0, "usb")?;
//! ```

pub mod drivers;
pub mod manager;

pub use drivers::{DriverSet, CACHE_PAGES, SECTORS_PER_PAGE};
pub use manager::MountManager;
