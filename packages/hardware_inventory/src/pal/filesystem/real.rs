use std::path::{Path, PathBuf};
use std::{fs, io};

use itertools::Itertools;

use crate::pal::{BlockAttribute, CacheAttribute, Filesystem, PciAttribute};
use crate::{Error, NodeId, ProcessorId};

const CPUINFO: &str = "proc/cpuinfo";
const NODE_ROOT: &str = "sys/devices/system/node";
const CPU_ROOT: &str = "sys/devices/system/cpu";
const PCI_DEVICES_ROOT: &str = "sys/bus/pci/devices";
const DRM_ROOT: &str = "sys/class/drm";
const BLOCK_ROOT: &str = "sys/block";
const MOUNTS: &str = "proc/mounts";

/// Locations searched for the PCI ID database, in order of preference.
const PCI_IDS_CANDIDATES: &[&str] = &[
    "usr/share/hwdata/pci.ids",
    "usr/share/misc/pci.ids",
    "usr/share/pci.ids",
    "var/lib/pciutils/pci.ids",
];

/// The virtual filesystem of the operating system, as seen from a configurable root.
///
/// With the default root of `/` this is simply the host we are running on.
#[derive(Debug)]
pub(crate) struct RootedFilesystem {
    root: PathBuf,
    pci_ids_path: Option<PathBuf>,
}

impl RootedFilesystem {
    pub(crate) const fn new(root: PathBuf, pci_ids_path: Option<PathBuf>) -> Self {
        Self { root, pci_ids_path }
    }

    fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    fn read(&self, relative: impl AsRef<Path>) -> Option<String> {
        fs::read_to_string(self.path(relative)).ok()
    }

    fn link_target(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        fs::read_link(self.path(relative)).ok()
    }

    fn link_target_name(&self, relative: impl AsRef<Path>) -> Option<String> {
        self.link_target(relative)?
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToString::to_string)
    }

    /// Lists the names of all entries of a directory, ascending.
    fn list_entry_names(&self, relative: impl AsRef<Path>) -> crate::Result<Vec<String>> {
        let path = self.path(relative);

        let entries = fs::read_dir(&path).map_err(|e| Error::source_unavailable(&path, e))?;

        Ok(entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().to_str().map(ToString::to_string))
            .sorted_unstable()
            .collect())
    }

    /// Lists the N of every `{prefix}{N}` entry in a directory, ascending.
    fn list_indexed_entries(
        &self,
        relative: impl AsRef<Path>,
        prefix: &str,
    ) -> crate::Result<Vec<u32>> {
        let path = self.path(relative);

        let entries = fs::read_dir(&path).map_err(|e| Error::source_unavailable(&path, e))?;

        Ok(entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix(prefix))
                    .and_then(|index| index.parse::<u32>().ok())
            })
            .sorted_unstable()
            .collect())
    }
}

impl Filesystem for RootedFilesystem {
    fn get_cpuinfo_contents(&self) -> Option<String> {
        self.read(CPUINFO)
    }

    fn list_numa_node_ids(&self) -> crate::Result<Option<Vec<NodeId>>> {
        if !self.path(NODE_ROOT).exists() {
            return Ok(None);
        }

        self.list_indexed_entries(NODE_ROOT, "node").map(Some)
    }

    fn list_numa_node_processor_ids(&self, node_id: NodeId) -> crate::Result<Vec<ProcessorId>> {
        self.list_indexed_entries(format!("{NODE_ROOT}/node{node_id}"), "cpu")
    }

    fn get_online_processors_contents(&self) -> Option<String> {
        self.read(format!("{CPU_ROOT}/online"))
    }

    fn list_processor_ids(&self) -> crate::Result<Vec<ProcessorId>> {
        self.list_indexed_entries(CPU_ROOT, "cpu")
    }

    fn get_core_id_contents(&self, processor_id: ProcessorId) -> Option<String> {
        self.read(format!("{CPU_ROOT}/cpu{processor_id}/topology/core_id"))
    }

    fn list_cache_indexes(&self, processor_id: ProcessorId) -> Vec<u32> {
        // A missing cache directory is normal (e.g. in some virtual machines).
        self.list_indexed_entries(format!("{CPU_ROOT}/cpu{processor_id}/cache"), "index")
            .unwrap_or_default()
    }

    fn get_cache_attribute_contents(
        &self,
        processor_id: ProcessorId,
        cache_index: u32,
        attribute: CacheAttribute,
    ) -> Option<String> {
        self.read(format!(
            "{CPU_ROOT}/cpu{processor_id}/cache/index{cache_index}/{}",
            attribute.file_name()
        ))
    }

    fn get_numa_node_distance_contents(&self, node_id: NodeId) -> Option<String> {
        self.read(format!("{NODE_ROOT}/node{node_id}/distance"))
    }

    fn get_numa_node_meminfo_contents(&self, node_id: NodeId) -> Option<String> {
        self.read(format!("{NODE_ROOT}/node{node_id}/meminfo"))
    }

    fn get_pci_ids_contents(&self) -> crate::Result<String> {
        if let Some(path) = &self.pci_ids_path {
            return fs::read_to_string(path).map_err(|e| Error::source_unavailable(path, e));
        }

        let mut last_error = None;

        for candidate in PCI_IDS_CANDIDATES {
            let path = self.path(candidate);

            match fs::read_to_string(&path) {
                Ok(contents) => return Ok(contents),
                Err(e) => last_error = Some(Error::source_unavailable(path, e)),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::source_unavailable(
                self.path("pci.ids"),
                io::Error::from(io::ErrorKind::NotFound),
            )
        }))
    }

    fn list_pci_device_addresses(&self) -> crate::Result<Vec<String>> {
        self.list_entry_names(PCI_DEVICES_ROOT)
    }

    fn get_pci_device_attribute_contents(
        &self,
        address: &str,
        attribute: PciAttribute,
    ) -> Option<String> {
        self.read(format!(
            "{PCI_DEVICES_ROOT}/{address}/{}",
            attribute.file_name()
        ))
    }

    fn get_pci_device_driver(&self, address: &str) -> Option<String> {
        self.link_target_name(format!("{PCI_DEVICES_ROOT}/{address}/driver"))
    }

    fn list_drm_card_indexes(&self) -> crate::Result<Option<Vec<u32>>> {
        if !self.path(DRM_ROOT).exists() {
            return Ok(None);
        }

        self.list_indexed_entries(DRM_ROOT, "card").map(Some)
    }

    fn get_drm_card_pci_address(&self, card_index: u32) -> Option<String> {
        self.link_target_name(format!("{DRM_ROOT}/card{card_index}/device"))
    }

    fn list_block_device_names(&self) -> crate::Result<Vec<String>> {
        self.list_entry_names(BLOCK_ROOT)
    }

    fn get_block_device_link(&self, device: &str) -> Option<String> {
        self.link_target(format!("{BLOCK_ROOT}/{device}"))?
            .to_str()
            .map(ToString::to_string)
    }

    fn list_block_partition_names(&self, device: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.path(format!("{BLOCK_ROOT}/{device}"))) else {
            return Vec::new();
        };

        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().join("partition").is_file())
            .filter_map(|entry| entry.file_name().to_str().map(ToString::to_string))
            .sorted_unstable()
            .collect()
    }

    fn get_block_attribute_contents(
        &self,
        device_path: &str,
        attribute: BlockAttribute,
    ) -> Option<String> {
        self.read(format!(
            "{BLOCK_ROOT}/{device_path}/{}",
            attribute.file_name()
        ))
    }

    fn get_mounts_contents(&self) -> Option<String> {
        self.read(MOUNTS)
    }
}
