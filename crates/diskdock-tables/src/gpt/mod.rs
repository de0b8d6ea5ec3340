//! GPT (GUID Partition Table) parsing
//!
//! Entered only from the protective-MBR branch of discovery. The parse is
//! all-or-nothing: a header that fails any fixed-constant check, or a table
//! that emits no records, is a failed parse, never a partial list.

pub mod types;

use crate::classify::{classify, has_boot_signature};
use crate::reader::SectorReader;
use crate::wbfs::WbfsHeader;
use diskdock_core::{Error, PartitionRecord, Result, SECTOR_SIZE};
use self::types::{GptEntry, GptHeader};

/// Entries scanned per table, independent of the header's declared count.
/// Bounds the sectors read on discovery; two sectors of entries.
pub const ENTRY_SCAN_LIMIT: usize = 8;

/// Parse the primary GPT and emit a record per usable entry.
///
/// # Errors
///
/// - [`Error::DeviceRead`] if the header or entry array is unreadable
/// - [`Error::InvalidTable`] if any header constant mismatches
/// - [`Error::EmptyTable`] if no entry produced a record
pub fn parse(reader: &mut SectorReader<'_>) -> Result<Vec<PartitionRecord>> {
    let header_sector = reader.sector(GptHeader::HEADER_LBA)?;
    let header = GptHeader::from_bytes(&header_sector)
        .ok_or_else(|| Error::invalid_table("GPT header signature mismatch"))?;
    header.validate().map_err(Error::invalid_table)?;

    let entry_bytes = reader.sectors(
        GptHeader::ENTRIES_LBA,
        ENTRY_SCAN_LIMIT * GptHeader::ENTRY_SIZE as usize / SECTOR_SIZE,
    )?;

    let scan = (header.entry_count as usize).min(ENTRY_SCAN_LIMIT);
    let mut records = Vec::new();

    for index in 0..scan {
        let offset = index * GptHeader::ENTRY_SIZE as usize;
        let entry = GptEntry::from_bytes(&entry_bytes[offset..offset + GptHeader::ENTRY_SIZE as usize]);

        let volume = match reader.volume(entry.first_lba) {
            Ok(buf) => buf,
            Err(_) => {
                tracing::debug!("GPT entry {index}: volume at LBA {} unreadable, skipping", entry.first_lba);
                continue;
            }
        };

        let container = WbfsHeader::probe(&volume);
        if container.is_none() && !has_boot_signature(&volume) {
            continue;
        }
        if container.is_none() && entry.span() == 0 {
            continue;
        }

        let record = PartitionRecord {
            fs: classify(&volume, None),
            lba_start: entry.first_lba,
            sector_count: container.map_or_else(|| entry.span(), |head| head.sector_count),
            bootable: false,
            raw_type: 0,
            table_index: index,
            ebr_sector: 0,
        };
        tracing::debug!("GPT entry {index}: {record}");
        records.push(record);
    }

    if records.is_empty() {
        return Err(Error::EmptyTable);
    }
    Ok(records)
}
