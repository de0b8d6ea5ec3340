//! # diskdock Tables
//!
//! Partition table discovery for diskdock.
//!
//! This crate reads raw sectors from a [`BlockDevice`](diskdock_core::BlockDevice)
//! and interprets whatever table format it finds:
//! - **MBR**: Master Boot Record, including extended/EBR chains
//! - **GPT**: GUID Partition Table (protective-MBR entry point)
//! - **WBFS**: disc-image container, with or without any partition table
//!
//! Discovery is one pass: [`discover`] walks the tables and returns the
//! ordered record list, skipping unreadable or malformed pieces of the
//! media wherever the format allows it.
//!
//! ## Example
//!
//! ```rust
//! use diskdock_core::MemDevice;
//! use diskdock_tables::discover;
//!
//! // A blank image carries no boot signature, so discovery finds nothing.
//! let mut device = MemDevice::new(vec![0u8; 512 * 64]);
//! let records = discover(&mut device).unwrap();
//! assert!(records.is_empty());
//! ```

pub mod classify;
pub mod discover;
pub mod gpt;
pub mod mbr;
pub mod reader;
pub mod wbfs;

pub use classify::classify;
pub use discover::discover;
pub use reader::SectorReader;
pub use wbfs::WbfsHeader;
