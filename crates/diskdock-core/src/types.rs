//! Core types for diskdock

use serde::{Deserialize, Serialize};
use std::fmt;

/// Filesystem label attached to a discovered partition.
///
/// MBR/EBR entries are labelled from their one-byte type code; GPT entries
/// from volume-boot-sector signatures. The WBFS container label always wins
/// over both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsKind {
    /// Empty/unused entry
    Unused,
    Fat12,
    Fat16,
    Fat32,
    Ntfs,
    /// Extended partition marker (never emitted as a record itself)
    Extended,
    /// Linux native (ext2/ext3/ext4)
    Linux,
    LinuxSwap,
    LinuxLvm,
    Osx,
    OsxBoot,
    OsxHfs,
    Luks,
    /// GPT protective marker
    Gpt,
    /// WBFS disc-image container
    Wbfs,
    /// MBR type code with no known mapping
    Unknown,
    /// GPT-derived volume matching no known boot-sector signature
    Null,
}

impl FsKind {
    /// Classify an MBR partition type code.
    ///
    /// Covers the common codes plus the hidden/vendor aliases of each
    /// family; anything else maps to `Unknown`.
    pub fn from_mbr_byte(code: u8) -> Self {
        match code {
            0x00 => FsKind::Unused,
            0x01 | 0x11 | 0x8d => FsKind::Fat12,
            0x04 | 0x06 | 0x0e | 0x12 | 0x14 | 0x16 | 0x1e | 0x24 | 0x90 | 0xde => FsKind::Fat16,
            0x05 | 0x0f | 0x85 => FsKind::Extended,
            0x07 | 0x17 | 0x27 | 0x86 | 0x87 => FsKind::Ntfs,
            0x0b | 0x0c | 0x1b | 0x1c | 0x97 => FsKind::Fat32,
            0x82 => FsKind::LinuxSwap,
            0x83 | 0x93 | 0xfd => FsKind::Linux,
            0x8e => FsKind::LinuxLvm,
            0xa8 => FsKind::Osx,
            0xab => FsKind::OsxBoot,
            0xaf => FsKind::OsxHfs,
            0xe8 => FsKind::Luks,
            0xee => FsKind::Gpt,
            _ => FsKind::Unknown,
        }
    }

    /// Short display label for this filesystem kind.
    pub fn label(&self) -> &'static str {
        match self {
            FsKind::Unused => "Unused",
            FsKind::Fat12 => "FAT12",
            FsKind::Fat16 => "FAT16",
            FsKind::Fat32 => "FAT32",
            FsKind::Ntfs => "NTFS",
            FsKind::Extended => "Extended",
            FsKind::Linux => "LINUX",
            FsKind::LinuxSwap => "LxSWP",
            FsKind::LinuxLvm => "LxLVM",
            FsKind::Osx => "OSX",
            FsKind::OsxBoot => "OSXBT",
            FsKind::OsxHfs => "OSXHF",
            FsKind::Luks => "LUKS",
            FsKind::Gpt => "GPT",
            FsKind::Wbfs => "WBFS",
            FsKind::Unknown => "Unknown",
            FsKind::Null => "NULL",
        }
    }
}

impl fmt::Display for FsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One discovered partition.
///
/// Records are appended in table order during a discovery pass and never
/// mutated afterwards; a new pass rebuilds the whole list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionRecord {
    /// Detected filesystem label
    pub fs: FsKind,

    /// Absolute starting sector
    pub lba_start: u64,

    /// Length in sectors (from the container header for WBFS records)
    pub sector_count: u64,

    /// Legacy active-partition status byte was set
    pub bootable: bool,

    /// Raw MBR type code (0 for GPT-derived and whole-disk records)
    pub raw_type: u8,

    /// Primary slot 0-3, owning slot for EBR-chain records, or GPT entry
    /// index
    pub table_index: usize,

    /// Absolute sector of the EBR that produced this record; 0 for
    /// primary/GPT records. Informational only: EBR next-pointers are
    /// relative to the chain root, so this cannot be used to re-walk.
    pub ebr_sector: u64,
}

impl PartitionRecord {
    /// Record for a container occupying the raw device with no partition
    /// table at all.
    pub fn whole_disk(fs: FsKind, sector_count: u64) -> Self {
        Self {
            fs,
            lba_start: 0,
            sector_count,
            bootable: false,
            raw_type: 0,
            table_index: 0,
            ebr_sector: 0,
        }
    }
}

impl fmt::Display for PartitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "partition {} [{} @ LBA {}, {} sectors]",
            self.table_index, self.fs, self.lba_start, self.sector_count
        )?;
        if self.bootable {
            write!(f, " bootable")?;
        }
        if self.ebr_sector != 0 {
            write!(f, " (EBR @ {})", self.ebr_sector)?;
        }
        Ok(())
    }
}
