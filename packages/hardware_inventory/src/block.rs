mod classification;
mod disk;
mod mounts;

pub use classification::{BusType, DriveType, StorageController};
pub use disk::{Disk, Partition};

use foldhash::HashMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::block::mounts::Mount;
use crate::error::ensure_supported;
use crate::pal::{BlockAttribute, Filesystem, FilesystemFacade};
use crate::{Category, Diagnostics, Options, Report, UNKNOWN};

/// The `size` attribute counts 512-byte sectors whatever the logical block size of the device.
const SECTOR_SIZE_BYTES: u64 = 512;

/// The block storage devices of the host.
///
/// RAM disks and loop devices with nothing attached are left out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockInfo {
    disks: Vec<Disk>,
}

impl BlockInfo {
    /// Takes inventory of the block storage devices of the host described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`][crate::Error::UnsupportedPlatform] on platforms
    /// without the Linux virtual filesystem and
    /// [`Error::SourceUnavailable`][crate::Error::SourceUnavailable] if the block device
    /// directory cannot be listed.
    pub fn load(options: &Options) -> crate::Result<Self> {
        ensure_supported(Category::Block)?;

        Self::from_filesystem(&options.filesystem(), options.diagnostics())
    }

    pub(crate) fn from_filesystem(
        fs: &FilesystemFacade,
        diagnostics: &dyn Diagnostics,
    ) -> crate::Result<Self> {
        let names = fs.list_block_device_names()?;

        let mounts = fs.get_mounts_contents().map_or_else(
            || {
                diagnostics.warn("no mount table, partitions will have no mount points");
                HashMap::default()
            },
            |contents| mounts::parse_mounts(&contents),
        );

        let disks: Vec<Disk> = names
            .iter()
            .filter(|name| !name.starts_with("ram"))
            .filter_map(|name| read_disk(fs, name, &mounts, diagnostics))
            .collect();

        tracing::debug!(disks = disks.len(), "enumerated block devices");

        Ok(Self { disks })
    }

    /// The disks, ascending by name.
    #[must_use]
    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    /// The combined capacity of all disks.
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.disks
            .iter()
            .fold(0, |total, disk| total.saturating_add(disk.size_bytes()))
    }
}

impl Serialize for BlockInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BlockInfo", 2)?;
        state.serialize_field("total_size_bytes", &self.total_size_bytes())?;
        state.serialize_field("disks", &self.disks)?;
        state.end()
    }
}

impl Report for BlockInfo {
    const CATEGORY: Category = Category::Block;
}

fn read_disk(
    fs: &FilesystemFacade,
    name: &str,
    mounts: &HashMap<String, Mount>,
    diagnostics: &dyn Diagnostics,
) -> Option<Disk> {
    let size_bytes = read_size(fs, name, diagnostics);

    if name.starts_with("loop") && size_bytes == 0 {
        tracing::debug!(device = name, "skipping loop device without backing file");
        return None;
    }

    let (drive_type, storage_controller) =
        classification::classify(name, read_flag(fs, name, BlockAttribute::Rotational));

    let bus_type = fs
        .get_block_device_link(name)
        .map_or(BusType::Unknown, |link| BusType::from_device_link(&link));

    let physical_block_size_bytes =
        read_number(fs, name, BlockAttribute::PhysicalBlockSize, diagnostics).unwrap_or(0);

    let mut partitions: Vec<Partition> = fs
        .list_block_partition_names(name)
        .into_iter()
        .map(|partition| read_partition(fs, name, partition, mounts, diagnostics))
        .collect();

    // Names sort sda10 before sda2, so order by number and keep name order among the rest.
    partitions.sort_by_key(|partition| partition.number.unwrap_or(u32::MAX));

    Some(Disk {
        name: name.to_string(),
        size_bytes,
        physical_block_size_bytes,
        drive_type,
        storage_controller,
        bus_type,
        removable: read_flag(fs, name, BlockAttribute::Removable).unwrap_or(false),
        vendor: read_text(fs, name, BlockAttribute::Vendor),
        model: read_text(fs, name, BlockAttribute::Model),
        serial_number: read_text(fs, name, BlockAttribute::Serial),
        partitions,
    })
}

fn read_partition(
    fs: &FilesystemFacade,
    disk: &str,
    name: String,
    mounts: &HashMap<String, Mount>,
    diagnostics: &dyn Diagnostics,
) -> Partition {
    let path = format!("{disk}/{name}");
    let mount = mounts.get(&name);

    Partition {
        number: read_number(fs, &path, BlockAttribute::PartitionNumber, diagnostics)
            .and_then(|number| u32::try_from(number).ok()),
        size_bytes: read_size(fs, &path, diagnostics),
        read_only: read_flag(fs, &path, BlockAttribute::ReadOnly).unwrap_or(false),
        mount_point: mount.map(|mount| mount.point.clone()),
        filesystem: mount.map(|mount| mount.filesystem.clone()),
        name,
    }
}

fn read_size(fs: &FilesystemFacade, device_path: &str, diagnostics: &dyn Diagnostics) -> u64 {
    read_number(fs, device_path, BlockAttribute::Size, diagnostics)
        .map_or(0, |sectors| sectors.saturating_mul(SECTOR_SIZE_BYTES))
}

/// Reads a numeric attribute. Absent attributes are silently `None`, garbage ones are reported.
fn read_number(
    fs: &FilesystemFacade,
    device_path: &str,
    attribute: BlockAttribute,
    diagnostics: &dyn Diagnostics,
) -> Option<u64> {
    let contents = fs.get_block_attribute_contents(device_path, attribute)?;
    let value = contents.trim();

    value.parse().ok().or_else(|| {
        diagnostics.warn(&format!(
            "block device {device_path} has an unparsable {}: {value}",
            attribute.file_name()
        ));
        None
    })
}

fn read_flag(fs: &FilesystemFacade, device_path: &str, attribute: BlockAttribute) -> Option<bool> {
    match fs.get_block_attribute_contents(device_path, attribute)?.trim() {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

/// SCSI devices pad vendor and model with spaces to a fixed width.
fn read_text(fs: &FilesystemFacade, device_path: &str, attribute: BlockAttribute) -> String {
    fs.get_block_attribute_contents(device_path, attribute)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
