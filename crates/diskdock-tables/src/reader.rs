//! Sector reader adapter
//!
//! Thin wrapper over the external block-device interface that turns its
//! boolean read contract into `Result`s sized for table walking.

use diskdock_core::{BlockDevice, Error, Result, SECTOR_SIZE};

/// Sectors fetched when probing a volume boot record.
///
/// Three sectors, not one: the ext2 superblock magic sits at byte 0x438 of
/// the volume and must land inside the probe buffer for the signature
/// classifier to see it.
pub const VBR_PROBE_SECTORS: usize = 3;

/// Blocking sector reads against one borrowed device.
pub struct SectorReader<'d> {
    device: &'d mut dyn BlockDevice,
}

impl<'d> SectorReader<'d> {
    pub fn new(device: &'d mut dyn BlockDevice) -> Self {
        Self { device }
    }

    /// Read a single sector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceRead`] if the device rejects the read. A
    /// failed read is permanent for the current discovery pass.
    pub fn sector(&mut self, lba: u64) -> Result<[u8; SECTOR_SIZE]> {
        let mut buf = [0u8; SECTOR_SIZE];
        if !self.device.read_sectors(lba, 1, &mut buf) {
            return Err(Error::device_read(lba, 1));
        }
        Ok(buf)
    }

    /// Read `count` consecutive sectors.
    pub fn sectors(&mut self, lba: u64, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count * SECTOR_SIZE];
        if !self.device.read_sectors(lba, count, &mut buf) {
            return Err(Error::device_read(lba, count));
        }
        Ok(buf)
    }

    /// Read the probe window for a volume boot record at `lba`.
    pub fn volume(&mut self, lba: u64) -> Result<Vec<u8>> {
        self.sectors(lba, VBR_PROBE_SECTORS)
    }
}
