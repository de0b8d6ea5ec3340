//! Mount coordinator
//!
//! Owns the device, the discovered partition records, and the sparse
//! mount-name bindings. Single-threaded by design: callers serialize all
//! operations against one device instance.

use crate::drivers::{DriverSet, CACHE_PAGES, SECTORS_PER_PAGE};
use diskdock_core::{mount_flags, BlockDevice, Error, FsKind, PartitionRecord, Result};
use diskdock_tables::discover;

/// Partition registry and mount lifecycle for one block device.
///
/// Construction starts the device up, checks for an inserted medium, and
/// runs one discovery pass. A device that fails either check leaves the
/// manager constructed but inert: no records, every mount rejected.
///
/// Dropping the manager unmounts everything, letting the drivers flush
/// cached writes, and then shuts the device down exactly once.
pub struct MountManager<D: BlockDevice> {
    device: D,
    drivers: DriverSet,
    online: bool,
    records: Vec<PartitionRecord>,
    bindings: Vec<String>,
}

impl<D: BlockDevice> MountManager<D> {
    /// Take ownership of `device`, start it up, and discover partitions.
    pub fn new(mut device: D, drivers: DriverSet) -> Self {
        let online = device.startup() && device.is_inserted();
        let mut manager = Self {
            device,
            drivers,
            online,
            records: Vec::new(),
            bindings: Vec::new(),
        };
        if manager.online {
            manager.rescan();
        } else {
            tracing::warn!("device failed startup or has no medium, registry stays empty");
        }
        manager
    }

    /// Rebuild the registry from scratch with a fresh discovery pass.
    ///
    /// Every current mount is released first; bindings do not survive a
    /// rescan. A discovery error leaves an empty registry.
    pub fn rescan(&mut self) -> usize {
        self.unmount_all();
        self.bindings.clear();
        self.records = match discover(&mut self.device) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("partition discovery failed: {err}");
                Vec::new()
            }
        };
        tracing::info!("discovered {} partition(s)", self.records.len());
        self.records.len()
    }

    /// Whether the device started up with a medium inserted.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// All discovered partitions, in table order.
    pub fn records(&self) -> &[PartitionRecord] {
        &self.records
    }

    /// One discovered partition.
    pub fn record(&self, index: usize) -> Option<&PartitionRecord> {
        self.records.get(index)
    }

    pub fn partition_count(&self) -> usize {
        self.records.len()
    }

    /// The mount name bound at `index`, if any.
    pub fn mount_name(&self, index: usize) -> Option<&str> {
        self.bindings
            .get(index)
            .filter(|name| !name.is_empty())
            .map(String::as_str)
    }

    /// Whether `index` currently holds a successful mount.
    pub fn is_mounted(&self, index: usize) -> bool {
        self.mount_name(index).is_some()
    }

    /// Mount the partition at `index` under `name`.
    ///
    /// Any existing binding at that index is torn down first. On driver
    /// failure the stored binding is cleared again and the error returned.
    ///
    /// # Errors
    ///
    /// - [`Error::BadIndex`] for an index outside the registry
    /// - [`Error::InvalidMountName`] for an empty name
    /// - [`Error::NoDriver`] when the filesystem label has no driver
    /// - [`Error::MountFailed`] when the driver rejects the mount
    pub fn mount(&mut self, index: usize, name: &str) -> Result<()> {
        let record = match self.records.get(index) {
            Some(record) => record.clone(),
            None => return Err(Error::BadIndex(index)),
        };
        if name.is_empty() {
            return Err(Error::InvalidMountName);
        }

        self.unmount(index);

        if self.bindings.len() < self.records.len() {
            self.bindings.resize(self.records.len(), String::new());
        }
        self.bindings[index] = name.to_string();

        let mounted = match record.fs {
            FsKind::Fat12 | FsKind::Fat16 | FsKind::Fat32 => self.drivers.fat.mount(
                name,
                &mut self.device,
                record.lba_start,
                CACHE_PAGES,
                SECTORS_PER_PAGE,
                0,
            ),
            FsKind::Ntfs => self.drivers.ntfs.mount(
                name,
                &mut self.device,
                record.lba_start,
                CACHE_PAGES,
                SECTORS_PER_PAGE,
                mount_flags::RECOVER | mount_flags::IGNORE_CASE | mount_flags::SUPERUSER,
            ),
            FsKind::Linux => self.drivers.ext2.mount(
                name,
                &mut self.device,
                record.lba_start,
                CACHE_PAGES,
                SECTORS_PER_PAGE,
                mount_flags::DEFAULT,
            ),
            // The container is consumed whole by the disc-image layer;
            // nothing enters the filesystem namespace.
            FsKind::Wbfs => true,
            other => {
                self.bindings[index].clear();
                return Err(Error::NoDriver(other));
            }
        };

        if !mounted {
            self.bindings[index].clear();
            tracing::warn!("driver rejected {} partition {index} as \"{name}\"", record.fs);
            return Err(Error::MountFailed {
                index,
                fs: record.fs,
            });
        }

        tracing::info!("mounted partition {index} ({}) as \"{name}:\"", record.fs);
        Ok(())
    }

    /// Release the mount at `index`, if any.
    ///
    /// The namespace token is offered to all three drivers; teardown of a
    /// name a driver does not own is harmless by contract. Never fails.
    pub fn unmount(&mut self, index: usize) {
        if !self.online {
            return;
        }
        let Some(binding) = self.bindings.get(index) else {
            return;
        };
        if binding.is_empty() {
            return;
        }

        let token = format!("{binding}:");
        self.drivers.fat.unmount(&token, true);
        self.drivers.ntfs.unmount(&token, true);
        self.drivers.ext2.unmount(&token, true);

        self.bindings[index].clear();
        tracing::info!("unmounted \"{token}\"");
    }

    /// Release every mount.
    pub fn unmount_all(&mut self) {
        for index in 0..self.records.len() {
            self.unmount(index);
        }
    }
}

impl<D: BlockDevice> Drop for MountManager<D> {
    fn drop(&mut self) {
        // Drivers flush their caches before the device goes away.
        self.unmount_all();
        self.device.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diskdock_core::{FilesystemDriver, MemDevice, SECTOR_SIZE};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, PartialEq)]
    enum Event {
        Mount {
            driver: &'static str,
            name: String,
            lba: u64,
            flags: u32,
        },
        Unmount {
            driver: &'static str,
            name: String,
        },
        Shutdown,
    }

    type Log = Arc<Mutex<Vec<Event>>>;

    struct MockDriver {
        tag: &'static str,
        accept: bool,
        log: Log,
    }

    impl FilesystemDriver for MockDriver {
        fn mount(
            &self,
            name: &str,
            _device: &mut dyn BlockDevice,
            start_lba: u64,
            _cache_pages: u32,
            _sectors_per_page: u32,
            flags: u32,
        ) -> bool {
            self.log.lock().unwrap().push(Event::Mount {
                driver: self.tag,
                name: name.to_string(),
                lba: start_lba,
                flags,
            });
            self.accept
        }

        fn unmount(&self, name: &str, _flush: bool) {
            self.log.lock().unwrap().push(Event::Unmount {
                driver: self.tag,
                name: name.to_string(),
            });
        }
    }

    struct TestDevice {
        inner: MemDevice,
        log: Log,
    }

    impl BlockDevice for TestDevice {
        fn startup(&mut self) -> bool {
            self.inner.startup()
        }
        fn is_inserted(&self) -> bool {
            self.inner.is_inserted()
        }
        fn read_sectors(&mut self, lba: u64, count: usize, out: &mut [u8]) -> bool {
            self.inner.read_sectors(lba, count, out)
        }
        fn shutdown(&mut self) {
            self.log.lock().unwrap().push(Event::Shutdown);
            self.inner.shutdown();
        }
    }

    fn drivers(log: &Log, fat_ok: bool, ntfs_ok: bool, ext2_ok: bool) -> DriverSet {
        DriverSet::new(
            Box::new(MockDriver { tag: "fat", accept: fat_ok, log: log.clone() }),
            Box::new(MockDriver { tag: "ntfs", accept: ntfs_ok, log: log.clone() }),
            Box::new(MockDriver { tag: "ext2", accept: ext2_ok, log: log.clone() }),
        )
    }

    fn sign(disk: &mut [u8], lba: u64) {
        let off = lba as usize * SECTOR_SIZE;
        disk[off + 510] = 0x55;
        disk[off + 511] = 0xAA;
    }

    fn write_entry(disk: &mut [u8], slot: usize, type_byte: u8, lba: u32, count: u32) {
        let off = 0x1BE + slot * 16;
        disk[off + 4] = type_byte;
        disk[off + 8..off + 12].copy_from_slice(&lba.to_le_bytes());
        disk[off + 12..off + 16].copy_from_slice(&count.to_le_bytes());
    }

    /// FAT32, NTFS, Linux, and an unknown type code, one per slot.
    fn test_disk() -> Vec<u8> {
        let mut disk = vec![0u8; 2048 * SECTOR_SIZE];
        sign(&mut disk, 0);
        for (slot, (ty, lba)) in [(0x0bu8, 64u32), (0x07, 300), (0x83, 600), (0x42, 900)]
            .iter()
            .enumerate()
        {
            write_entry(&mut disk, slot, *ty, *lba, 100);
            sign(&mut disk, *lba as u64);
        }
        disk
    }

    fn wbfs_disk() -> Vec<u8> {
        let mut disk = vec![0u8; 64 * SECTOR_SIZE];
        disk[..4].copy_from_slice(b"WBFS");
        disk[4..8].copy_from_slice(&64u32.to_be_bytes());
        disk
    }

    fn manager_over(disk: Vec<u8>, log: &Log) -> MountManager<TestDevice> {
        let device = TestDevice {
            inner: MemDevice::new(disk),
            log: log.clone(),
        };
        MountManager::new(device, drivers(log, true, true, true))
    }

    #[test]
    fn test_construction_discovers() {
        let log = Log::default();
        let manager = manager_over(test_disk(), &log);
        assert!(manager.is_online());
        assert_eq!(manager.partition_count(), 4);
        assert_eq!(manager.record(0).unwrap().fs, FsKind::Fat32);
    }

    #[test]
    fn test_mount_dispatches_fat() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        manager.mount(0, "usb").unwrap();
        assert!(manager.is_mounted(0));
        assert_eq!(manager.mount_name(0), Some("usb"));
        assert!(log.lock().unwrap().contains(&Event::Mount {
            driver: "fat",
            name: "usb".to_string(),
            lba: 64,
            flags: 0,
        }));
    }

    #[test]
    fn test_ntfs_mount_flags_always_set() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        manager.mount(1, "win").unwrap();
        assert!(log.lock().unwrap().contains(&Event::Mount {
            driver: "ntfs",
            name: "win".to_string(),
            lba: 300,
            flags: mount_flags::RECOVER | mount_flags::IGNORE_CASE | mount_flags::SUPERUSER,
        }));
    }

    #[test]
    fn test_ext2_mount_default_flags() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        manager.mount(2, "lnx").unwrap();
        assert!(log.lock().unwrap().contains(&Event::Mount {
            driver: "ext2",
            name: "lnx".to_string(),
            lba: 600,
            flags: mount_flags::DEFAULT,
        }));
    }

    #[test]
    fn test_unknown_label_has_no_driver() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        let err = manager.mount(3, "huh").unwrap_err();
        assert!(matches!(err, Error::NoDriver(FsKind::Unknown)));
        assert!(!manager.is_mounted(3));
    }

    #[test]
    fn test_container_mounts_trivially() {
        let log = Log::default();
        let mut manager = manager_over(wbfs_disk(), &log);

        assert_eq!(manager.partition_count(), 1);
        manager.mount(0, "wbfs").unwrap();
        assert!(manager.is_mounted(0));
        // No driver was asked to do anything for the container.
        assert!(!log
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, Event::Mount { .. })));
    }

    #[test]
    fn test_mount_invalid_arguments() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        assert!(matches!(manager.mount(9, "x"), Err(Error::BadIndex(9))));
        assert!(matches!(manager.mount(0, ""), Err(Error::InvalidMountName)));
        assert!(!manager.is_mounted(0));
    }

    #[test]
    fn test_remount_tears_down_previous_binding() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        manager.mount(0, "usb").unwrap();
        log.lock().unwrap().clear();

        manager.mount(0, "disc").unwrap();
        let events = log.lock().unwrap();

        // Old binding released through all three drivers, then the new mount.
        assert_eq!(
            events[..3],
            [
                Event::Unmount { driver: "fat", name: "usb:".to_string() },
                Event::Unmount { driver: "ntfs", name: "usb:".to_string() },
                Event::Unmount { driver: "ext2", name: "usb:".to_string() },
            ]
        );
        assert_eq!(
            events[3],
            Event::Mount { driver: "fat", name: "disc".to_string(), lba: 64, flags: 0 }
        );
        drop(events);
        assert_eq!(manager.mount_name(0), Some("disc"));
    }

    #[test]
    fn test_driver_rejection_clears_binding() {
        let log = Log::default();
        let device = TestDevice { inner: MemDevice::new(test_disk()), log: log.clone() };
        let mut manager = MountManager::new(device, drivers(&log, false, true, true));

        let err = manager.mount(0, "usb").unwrap_err();
        assert!(matches!(err, Error::MountFailed { index: 0, fs: FsKind::Fat32 }));
        assert!(!manager.is_mounted(0));
        assert_eq!(manager.mount_name(0), None);
    }

    #[test]
    fn test_unmount_builds_namespace_token() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        manager.mount(0, "sd").unwrap();
        log.lock().unwrap().clear();
        manager.unmount(0);

        let events = log.lock().unwrap();
        assert!(events.contains(&Event::Unmount { driver: "fat", name: "sd:".to_string() }));
        assert!(events.contains(&Event::Unmount { driver: "ntfs", name: "sd:".to_string() }));
        assert!(events.contains(&Event::Unmount { driver: "ext2", name: "sd:".to_string() }));
        drop(events);
        assert!(!manager.is_mounted(0));
    }

    #[test]
    fn test_unmount_unbound_index_is_noop() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        manager.mount(1, "win").unwrap();
        log.lock().unwrap().clear();

        manager.unmount(0);
        manager.unmount(99);

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(manager.partition_count(), 4);
        assert!(manager.is_mounted(1));
    }

    #[test]
    fn test_rescan_releases_mounts_and_rebuilds() {
        let log = Log::default();
        let mut manager = manager_over(test_disk(), &log);

        manager.mount(0, "usb").unwrap();
        log.lock().unwrap().clear();

        assert_eq!(manager.rescan(), 4);
        assert!(!manager.is_mounted(0));
        assert!(log
            .lock()
            .unwrap()
            .contains(&Event::Unmount { driver: "fat", name: "usb:".to_string() }));
    }

    #[test]
    fn test_offline_device_is_inert() {
        let log = Log::default();
        let device = TestDevice {
            inner: MemDevice::new(test_disk()).ejected(),
            log: log.clone(),
        };
        let mut manager = MountManager::new(device, drivers(&log, true, true, true));

        assert!(!manager.is_online());
        assert_eq!(manager.partition_count(), 0);
        assert!(matches!(manager.mount(0, "usb"), Err(Error::BadIndex(0))));
    }

    #[test]
    fn test_drop_unmounts_then_shuts_down() {
        let log = Log::default();
        {
            let mut manager = manager_over(test_disk(), &log);
            manager.mount(0, "usb").unwrap();
            log.lock().unwrap().clear();
        }

        let events = log.lock().unwrap();
        let shutdown_at = events.iter().position(|e| *e == Event::Shutdown).unwrap();
        let unmount_at = events
            .iter()
            .position(|e| matches!(e, Event::Unmount { .. }))
            .unwrap();
        assert!(unmount_at < shutdown_at);
        assert_eq!(events.iter().filter(|e| **e == Event::Shutdown).count(), 1);
    }
}
