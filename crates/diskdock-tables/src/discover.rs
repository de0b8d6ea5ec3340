//! Partition discovery
//!
//! One pass over the media: `Start → {RawContainer, MBR} → {nothing,
//! ExtendedChain, GPT}`. A container at sector 0 wins outright; a
//! protective-MBR marker in slot 0 hands the whole disk to the GPT parser;
//! otherwise the four primary slots are walked, extended slots expanding
//! into their EBR chains in place.

use crate::classify::{classify, has_boot_signature};
use crate::gpt;
use crate::mbr::types::TYPE_GPT_PROTECTIVE;
use crate::mbr::BootRecord;
use crate::reader::SectorReader;
use crate::wbfs::WbfsHeader;
use diskdock_core::{BlockDevice, FsKind, PartitionRecord, Result};

/// Upper bound on EBR chain length. The format terminates chains with a
/// zero next-pointer; corrupt media may not.
pub const EBR_CHAIN_LIMIT: usize = 128;

/// Walk the partition tables of `device` and return every discovered
/// partition, in table order.
///
/// Unreadable or malformed pieces of the media are skipped where the
/// format allows it: a primary slot whose volume is unreadable or
/// unsigned contributes nothing, and an MBR without its boot signature
/// yields an empty list.
///
/// # Errors
///
/// - [`Error::DeviceRead`](diskdock_core::Error::DeviceRead) if sector 0
///   cannot be read
/// - any [`gpt::parse`] error, when slot 0 carries the GPT protective
///   marker: GPT discovery is all-or-nothing and never falls back to the
///   MBR interpretation
pub fn discover(device: &mut dyn BlockDevice) -> Result<Vec<PartitionRecord>> {
    let mut reader = SectorReader::new(device);
    let sector0 = reader.sector(0)?;

    // A raw container needs no partition table at all.
    if let Some(head) = WbfsHeader::probe(&sector0) {
        tracing::info!("raw WBFS container, {} sectors", head.sector_count);
        return Ok(vec![PartitionRecord::whole_disk(FsKind::Wbfs, head.sector_count)]);
    }

    let Some(table) = BootRecord::parse(&sector0) else {
        tracing::debug!("sector 0 carries no boot signature, no partitions");
        return Ok(Vec::new());
    };

    let mut records = Vec::new();

    for (slot, entry) in table.entries().iter().enumerate() {
        let volume = match reader.volume(entry.lba_start as u64) {
            Ok(buf) => buf,
            Err(_) => {
                tracing::debug!("slot {slot}: volume at LBA {} unreadable, skipping", entry.lba_start);
                continue;
            }
        };

        let container = WbfsHeader::probe(&volume);

        // Slot 0 decides the table format before anything else is walked:
        // a protective marker switches discovery to GPT exclusively.
        if container.is_none() && slot == 0 && entry.type_byte == TYPE_GPT_PROTECTIVE {
            tracing::debug!("slot 0 is GPT protective, switching to GPT");
            return gpt::parse(&mut reader);
        }

        if container.is_none() && !has_boot_signature(&volume) {
            continue;
        }

        if container.is_none() && entry.is_extended() {
            walk_ebr_chain(&mut reader, slot, entry.lba_start as u64, &mut records);
            continue;
        }

        if container.is_some() || entry.sector_count > 0 {
            let record = PartitionRecord {
                fs: classify(&volume, Some(entry.type_byte)),
                lba_start: entry.lba_start as u64,
                sector_count: container
                    .map_or(entry.sector_count as u64, |head| head.sector_count),
                bootable: entry.is_bootable(),
                raw_type: entry.type_byte,
                table_index: slot,
                ebr_sector: 0,
            };
            tracing::debug!("slot {slot}: {record}");
            records.push(record);
        }
    }

    Ok(records)
}

/// Walk the EBR chain rooted at `root_lba`.
///
/// Every next-pointer in the chain is relative to the chain root, not to
/// the EBR holding it. The chain ends on a zero next-pointer, an invalid
/// signature (unless that sector is a container), or an unreadable
/// sector; none of these is an error for the discovery pass.
fn walk_ebr_chain(
    reader: &mut SectorReader<'_>,
    slot: usize,
    root_lba: u64,
    records: &mut Vec<PartitionRecord>,
) {
    let mut next_offset = 0u64;

    for _ in 0..EBR_CHAIN_LIMIT {
        let ebr_lba = root_lba + next_offset;
        let sector = match reader.sector(ebr_lba) {
            Ok(buf) => buf,
            Err(_) => {
                tracing::debug!("EBR at LBA {ebr_lba} unreadable, ending chain");
                return;
            }
        };

        let container = WbfsHeader::probe(&sector);
        if container.is_none() && !has_boot_signature(&sector) {
            return;
        }

        let ebr = BootRecord::parse_unchecked(&sector);
        let part = ebr.ebr_partition();

        if container.is_some() || part.sector_count > 0 {
            let record = PartitionRecord {
                fs: classify(&sector, Some(part.type_byte)),
                lba_start: ebr_lba + part.lba_start as u64,
                sector_count: container
                    .map_or(part.sector_count as u64, |head| head.sector_count),
                bootable: part.is_bootable(),
                raw_type: part.type_byte,
                table_index: slot,
                ebr_sector: ebr_lba,
            };
            tracing::debug!("EBR at LBA {ebr_lba}: {record}");
            records.push(record);
        }

        next_offset = ebr.ebr_next().lba_start as u64;
        if next_offset == 0 {
            return;
        }
    }

    tracing::warn!("EBR chain at LBA {root_lba} exceeded {EBR_CHAIN_LIMIT} links, truncating");
}
