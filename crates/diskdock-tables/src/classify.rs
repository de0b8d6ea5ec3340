//! Signature classifier
//!
//! One pure function decides the filesystem label at every table-walking
//! site, so the MBR, EBR, and GPT paths cannot drift apart.

use crate::wbfs::WbfsHeader;
use diskdock_core::FsKind;

/// Offset of the 0xAA55 boot signature within a boot/volume sector.
pub const BOOT_SIGNATURE_OFFSET: usize = 510;

/// "NTFS" OEM tag offset inside an NTFS volume boot record.
pub const BPB_NTFS_OFFSET: usize = 0x03;
/// FAT filesystem-type field offset in a FAT32 BPB.
pub const BPB_FAT32_OFFSET: usize = 0x52;
/// FAT filesystem-type field offset in a FAT12/FAT16 BPB.
pub const BPB_FAT16_OFFSET: usize = 0x36;
/// ext2 superblock magic offset from the start of the volume.
pub const EXT_SUPERBLOCK_OFFSET: usize = 0x438;

const NTFS_SIG: &[u8] = b"NTFS";
const FAT_SIG: &[u8] = b"FAT";
const EXT_MAGIC: [u8; 2] = [0x53, 0xEF];

/// Check the trailing 0xAA55 signature shared by MBR, EBR, and volume boot
/// sectors.
pub fn has_boot_signature(sector: &[u8]) -> bool {
    sector.len() >= BOOT_SIGNATURE_OFFSET + 2
        && sector[BOOT_SIGNATURE_OFFSET] == 0x55
        && sector[BOOT_SIGNATURE_OFFSET + 1] == 0xAA
}

/// Best-guess filesystem label for a probed boot/volume sector.
///
/// The container check always runs first and overrides everything else.
/// With a partition type byte available (MBR/EBR entries) the label comes
/// from the type-code table; without one (GPT entries) it comes from
/// fixed-offset signature strings, first match wins, or [`FsKind::Null`]
/// when nothing matches.
pub fn classify(sector: &[u8], type_byte: Option<u8>) -> FsKind {
    if WbfsHeader::probe(sector).is_some() {
        return FsKind::Wbfs;
    }
    match type_byte {
        Some(code) => FsKind::from_mbr_byte(code),
        None => probe_signatures(sector),
    }
}

fn matches_at(sector: &[u8], offset: usize, sig: &[u8]) -> bool {
    sector.len() >= offset + sig.len() && &sector[offset..offset + sig.len()] == sig
}

fn probe_signatures(sector: &[u8]) -> FsKind {
    if matches_at(sector, BPB_NTFS_OFFSET, NTFS_SIG) {
        FsKind::Ntfs
    } else if matches_at(sector, BPB_FAT32_OFFSET, FAT_SIG) {
        FsKind::Fat32
    } else if matches_at(sector, BPB_FAT16_OFFSET, FAT_SIG) {
        FsKind::Fat16
    } else if matches_at(sector, EXT_SUPERBLOCK_OFFSET, &EXT_MAGIC) {
        FsKind::Linux
    } else {
        FsKind::Null
    }
}
