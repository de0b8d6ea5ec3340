//! GPT header and partition entry layout

/// GPT header, as read from its fixed location at LBA 1.
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       8     Signature ("EFI PART")
/// 8       4     Revision
/// 12      4     Header size
/// 16      4     Header CRC32
/// 20      4     Reserved (must be zero)
/// 24      8     Current (header) LBA
/// 32      8     Backup header LBA
/// 40      8     First usable LBA
/// 48      8     Last usable LBA
/// 56      16    Disk GUID
/// 72      8     Partition entries LBA
/// 80      4     Number of partition entries
/// 84      4     Size of each partition entry
/// 88      4     Partition entries CRC32
/// ```
#[derive(Debug, Clone)]
pub struct GptHeader {
    pub signature: [u8; 8],
    pub revision: u32,
    pub header_size: u32,
    pub header_crc32: u32,
    pub reserved: u32,
    pub current_lba: u64,
    pub backup_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub disk_guid: [u8; 16],
    pub entries_lba: u64,
    pub entry_count: u32,
    pub entry_size: u32,
    pub entries_crc32: u32,
}

impl GptHeader {
    /// GPT header signature
    pub const SIGNATURE: &'static [u8; 8] = b"EFI PART";

    /// Minimal header size
    pub const HEADER_SIZE: usize = 92;

    /// Required size of each partition entry
    pub const ENTRY_SIZE: u32 = 128;

    /// Fixed LBA of the primary header
    pub const HEADER_LBA: u64 = 1;

    /// Fixed LBA of the partition entry array
    pub const ENTRIES_LBA: u64 = 2;

    /// Fixed first usable LBA for partitions
    pub const FIRST_USABLE_LBA: u64 = 34;

    /// Decode a header, gating on the 8-byte signature.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::HEADER_SIZE {
            return None;
        }

        let mut signature = [0u8; 8];
        signature.copy_from_slice(&bytes[0..8]);
        if &signature != Self::SIGNATURE {
            return None;
        }

        let mut disk_guid = [0u8; 16];
        disk_guid.copy_from_slice(&bytes[56..72]);

        Some(Self {
            signature,
            revision: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            header_size: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            header_crc32: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            reserved: u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
            current_lba: u64::from_le_bytes([
                bytes[24], bytes[25], bytes[26], bytes[27],
                bytes[28], bytes[29], bytes[30], bytes[31],
            ]),
            backup_lba: u64::from_le_bytes([
                bytes[32], bytes[33], bytes[34], bytes[35],
                bytes[36], bytes[37], bytes[38], bytes[39],
            ]),
            first_usable_lba: u64::from_le_bytes([
                bytes[40], bytes[41], bytes[42], bytes[43],
                bytes[44], bytes[45], bytes[46], bytes[47],
            ]),
            last_usable_lba: u64::from_le_bytes([
                bytes[48], bytes[49], bytes[50], bytes[51],
                bytes[52], bytes[53], bytes[54], bytes[55],
            ]),
            disk_guid,
            entries_lba: u64::from_le_bytes([
                bytes[72], bytes[73], bytes[74], bytes[75],
                bytes[76], bytes[77], bytes[78], bytes[79],
            ]),
            entry_count: u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]),
            entry_size: u32::from_le_bytes([bytes[84], bytes[85], bytes[86], bytes[87]]),
            entries_crc32: u32::from_le_bytes([bytes[88], bytes[89], bytes[90], bytes[91]]),
        })
    }

    /// Check the fixed layout constants of a primary GPT header.
    ///
    /// Any mismatch fails the whole parse; there is no partial GPT result.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.entry_size != Self::ENTRY_SIZE {
            return Err("GPT entry size is not 128");
        }
        if self.entries_lba != Self::ENTRIES_LBA {
            return Err("GPT entry array is not at LBA 2");
        }
        if self.current_lba != Self::HEADER_LBA {
            return Err("GPT header does not claim LBA 1");
        }
        if self.first_usable_lba != Self::FIRST_USABLE_LBA {
            return Err("GPT first usable LBA is not 34");
        }
        if self.reserved != 0 {
            return Err("GPT reserved field is not zero");
        }
        Ok(())
    }
}

/// The slice of a 128-byte GPT partition entry that discovery consumes.
#[derive(Debug, Clone, Copy)]
pub struct GptEntry {
    /// First LBA (inclusive)
    pub first_lba: u64,
    /// Last LBA
    pub last_lba: u64,
}

impl GptEntry {
    /// Decode one entry from its 128 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() >= GptHeader::ENTRY_SIZE as usize);
        Self {
            first_lba: u64::from_le_bytes([
                bytes[32], bytes[33], bytes[34], bytes[35],
                bytes[36], bytes[37], bytes[38], bytes[39],
            ]),
            last_lba: u64::from_le_bytes([
                bytes[40], bytes[41], bytes[42], bytes[43],
                bytes[44], bytes[45], bytes[46], bytes[47],
            ]),
        }
    }

    /// Partition span in sectors, `last - first`.
    pub fn span(&self) -> u64 {
        self.last_lba.saturating_sub(self.first_lba)
    }
}
