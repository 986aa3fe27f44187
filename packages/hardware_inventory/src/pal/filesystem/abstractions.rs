use std::fmt::Debug;

use crate::{NodeId, ProcessorId};

/// Linux has this funny notion of exposing various OS APIs as a virtual filesystem. This trait
/// abstracts this virtual filesystem to allow it to be mocked.
///
/// All paths are relative to the configured root, so an implementation may be looking at a
/// snapshot or bind-mount of another host rather than at the host it is running on. All I/O is
/// synchronous and blocking because we expect it to hit a fast path in the OS, given the data is
/// never on a real storage device.
///
/// Methods returning `Option` treat any read failure as absence. Methods returning
/// `crate::Result` are reading something a whole inventory category cannot do without.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Filesystem: Debug + Send + Sync + 'static {
    /// Get the contents of the /proc/cpuinfo file, or `None` if it cannot be read.
    ///
    /// This is a plaintext file with "key    : value" pairs, blocks separated by empty lines.
    fn get_cpuinfo_contents(&self) -> Option<String>;

    /// Lists the NUMA node IDs that have a /sys/devices/system/node/node{} directory,
    /// in ascending order.
    ///
    /// Returns `Ok(None)` if /sys/devices/system/node does not exist at all, which happens on
    /// kernels built without NUMA support.
    fn list_numa_node_ids(&self) -> crate::Result<Option<Vec<NodeId>>>;

    /// Lists the processors that have a /sys/devices/system/node/node{}/cpu{} entry,
    /// in ascending order.
    fn list_numa_node_processor_ids(&self, node_id: NodeId) -> crate::Result<Vec<ProcessorId>>;

    /// Gets the contents of the /sys/devices/system/cpu/online file.
    ///
    /// This is a cpulist format file ("0,1,2-4,5-10:2" style list).
    fn get_online_processors_contents(&self) -> Option<String>;

    /// Lists the processors that have a /sys/devices/system/cpu/cpu{} directory,
    /// in ascending order.
    fn list_processor_ids(&self) -> crate::Result<Vec<ProcessorId>>;

    /// Gets the contents of the /sys/devices/system/cpu/cpu{}/topology/core_id file.
    fn get_core_id_contents(&self, processor_id: ProcessorId) -> Option<String>;

    /// Lists the K of every /sys/devices/system/cpu/cpu{}/cache/index{K} directory,
    /// in ascending order.
    ///
    /// Returns an empty list if the processor has no cache directory.
    fn list_cache_indexes(&self, processor_id: ProcessorId) -> Vec<u32>;

    /// Gets the contents of one attribute file of
    /// /sys/devices/system/cpu/cpu{}/cache/index{}.
    fn get_cache_attribute_contents(
        &self,
        processor_id: ProcessorId,
        cache_index: u32,
        attribute: CacheAttribute,
    ) -> Option<String>;

    /// Gets the contents of the /sys/devices/system/node/node{}/distance file.
    ///
    /// This is a single line of space-separated relative distances, one per node.
    fn get_numa_node_distance_contents(&self, node_id: NodeId) -> Option<String>;

    /// Gets the contents of the /sys/devices/system/node/node{}/meminfo file.
    ///
    /// This is a plaintext file with "Node N Key:     value kB" lines.
    fn get_numa_node_meminfo_contents(&self, node_id: NodeId) -> Option<String>;

    /// Gets the contents of the PCI ID database (`pci.ids`).
    ///
    /// Either the explicitly configured file or the first readable of the well-known
    /// locations under the root.
    fn get_pci_ids_contents(&self) -> crate::Result<String>;

    /// Lists the entries of /sys/bus/pci/devices, which are PCI addresses such as
    /// `0000:00:1f.2`, in ascending order.
    fn list_pci_device_addresses(&self) -> crate::Result<Vec<String>>;

    /// Gets the contents of one attribute file of /sys/bus/pci/devices/{address}.
    fn get_pci_device_attribute_contents(
        &self,
        address: &str,
        attribute: PciAttribute,
    ) -> Option<String>;

    /// Gets the name of the driver bound to a PCI device, which is the final component of the
    /// /sys/bus/pci/devices/{address}/driver symlink target.
    fn get_pci_device_driver(&self, address: &str) -> Option<String>;

    /// Lists the N of every /sys/class/drm/card{N} entry, in ascending order.
    ///
    /// Connector entries such as `card0-HDMI-A-1` are not cards and are not listed.
    ///
    /// Returns `Ok(None)` if /sys/class/drm does not exist at all, which happens on hosts
    /// without any display driver loaded.
    fn list_drm_card_indexes(&self) -> crate::Result<Option<Vec<u32>>>;

    /// Gets the PCI address of a graphics card, which is the final component of the
    /// /sys/class/drm/card{}/device symlink target.
    fn get_drm_card_pci_address(&self, card_index: u32) -> Option<String>;

    /// Lists the entries of /sys/block, which are block device names such as `sda` or
    /// `nvme0n1`, in ascending order.
    fn list_block_device_names(&self) -> crate::Result<Vec<String>>;

    /// Gets the target of the /sys/block/{} symlink, which is the path of the device in the
    /// sysfs device tree and therefore tells which bus it hangs off.
    fn get_block_device_link(&self, device: &str) -> Option<String>;

    /// Lists the partitions of a block device, which are the subdirectories of
    /// /sys/block/{} that contain a `partition` file, in ascending order of name.
    ///
    /// Returns an empty list if the device has no partitions or cannot be read.
    fn list_block_partition_names(&self, device: &str) -> Vec<String>;

    /// Gets the contents of one attribute file of /sys/block/{device_path}.
    ///
    /// The device path is either a device name (`sda`) or a device name and one of its
    /// partitions (`sda/sda1`).
    fn get_block_attribute_contents(
        &self,
        device_path: &str,
        attribute: BlockAttribute,
    ) -> Option<String>;

    /// Gets the contents of the /proc/mounts file.
    ///
    /// This is a plaintext file with one "device mount-point filesystem options 0 0" line per
    /// mounted filesystem, with spaces and other special characters in fields octal-escaped.
    fn get_mounts_contents(&self) -> Option<String>;
}

/// The attribute files of a /sys/devices/system/cpu/cpu{}/cache/index{} directory
/// that we read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CacheAttribute {
    Level,
    Type,
    Size,
    SharedCpuList,
    SharedCpuMap,
}

impl CacheAttribute {
    pub(crate) const fn file_name(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Type => "type",
            Self::Size => "size",
            Self::SharedCpuList => "shared_cpu_list",
            Self::SharedCpuMap => "shared_cpu_map",
        }
    }
}

/// The attribute files of a /sys/block/{} directory (or a partition subdirectory) that we read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BlockAttribute {
    /// Size in 512-byte sectors, regardless of the logical block size of the device.
    Size,
    ReadOnly,
    Removable,
    Rotational,
    PhysicalBlockSize,
    Vendor,
    Model,
    Serial,
    PartitionNumber,
}

impl BlockAttribute {
    pub(crate) const fn file_name(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::ReadOnly => "ro",
            Self::Removable => "removable",
            Self::Rotational => "queue/rotational",
            Self::PhysicalBlockSize => "queue/physical_block_size",
            Self::Vendor => "device/vendor",
            Self::Model => "device/model",
            Self::Serial => "device/serial",
            Self::PartitionNumber => "partition",
        }
    }
}

/// The attribute files of a /sys/bus/pci/devices/{address} directory that we read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PciAttribute {
    Modalias,
    Revision,
    NumaNode,
}

impl PciAttribute {
    pub(crate) const fn file_name(self) -> &'static str {
        match self {
            Self::Modalias => "modalias",
            Self::Revision => "revision",
            Self::NumaNode => "numa_node",
        }
    }
}
