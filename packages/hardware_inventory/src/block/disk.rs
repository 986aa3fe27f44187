use serde::Serialize;

use crate::{BusType, DriveType, StorageController};

/// A partition of a disk.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Partition {
    pub(crate) name: String,
    pub(crate) number: Option<u32>,
    pub(crate) size_bytes: u64,
    pub(crate) read_only: bool,
    pub(crate) mount_point: Option<String>,
    pub(crate) filesystem: Option<String>,
}

impl Partition {
    /// The kernel's name for the partition, e.g. `sda1` or `nvme0n1p1`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The position of the partition in the partition table, if the kernel says.
    #[must_use]
    pub const fn number(&self) -> Option<u32> {
        self.number
    }

    /// The capacity of the partition, or 0 if it could not be determined.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Whether the kernel refuses writes to the partition.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    /// Where the partition is mounted, if it is.
    #[must_use]
    pub fn mount_point(&self) -> Option<&str> {
        self.mount_point.as_deref()
    }

    /// The type of the mounted filesystem, e.g. `ext4`. Unmounted partitions have none.
    #[must_use]
    pub fn filesystem(&self) -> Option<&str> {
        self.filesystem.as_deref()
    }
}

/// A whole-disk block device and its partitions.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Disk {
    pub(crate) name: String,
    pub(crate) size_bytes: u64,
    pub(crate) physical_block_size_bytes: u64,
    pub(crate) drive_type: DriveType,
    pub(crate) storage_controller: StorageController,
    pub(crate) bus_type: BusType,
    pub(crate) removable: bool,
    pub(crate) vendor: String,
    pub(crate) model: String,
    pub(crate) serial_number: String,
    pub(crate) partitions: Vec<Partition>,
}

impl Disk {
    /// The kernel's name for the disk, e.g. `sda` or `nvme0n1`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The capacity of the disk, or 0 if it could not be determined.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// The smallest unit the disk can write without a read-modify-write cycle, or 0 if it
    /// could not be determined.
    #[must_use]
    pub const fn physical_block_size_bytes(&self) -> u64 {
        self.physical_block_size_bytes
    }

    /// The kind of medium, e.g. SSD or optical disc.
    #[must_use]
    pub const fn drive_type(&self) -> DriveType {
        self.drive_type
    }

    /// The kind of controller the kernel drives the disk through.
    #[must_use]
    pub const fn storage_controller(&self) -> StorageController {
        self.storage_controller
    }

    /// The bus the disk hangs off.
    #[must_use]
    pub const fn bus_type(&self) -> BusType {
        self.bus_type
    }

    /// Whether the medium can be removed, as with card readers and optical drives.
    #[must_use]
    pub const fn removable(&self) -> bool {
        self.removable
    }

    /// The vendor the device reports, or [`UNKNOWN`][crate::UNKNOWN]. NVMe and MMC devices
    /// usually report none.
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// The model the device reports, or [`UNKNOWN`][crate::UNKNOWN].
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The serial number the device reports, or [`UNKNOWN`][crate::UNKNOWN].
    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// The partitions, ascending by partition number.
    #[must_use]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }
}
