use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(test)]
use crate::pal::MockFilesystem;
use crate::pal::{BlockAttribute, CacheAttribute, Filesystem, PciAttribute, RootedFilesystem};
use crate::{NodeId, ProcessorId};

/// Enum to hide the different filesystem implementations behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum FilesystemFacade {
    Rooted(Arc<RootedFilesystem>),

    #[cfg(test)]
    Mock(Arc<MockFilesystem>),
}

impl FilesystemFacade {
    pub(crate) fn rooted(root: PathBuf, pci_ids_path: Option<PathBuf>) -> Self {
        Self::Rooted(Arc::new(RootedFilesystem::new(root, pci_ids_path)))
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockFilesystem) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Filesystem for FilesystemFacade {
    fn get_cpuinfo_contents(&self) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_cpuinfo_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_cpuinfo_contents(),
        }
    }

    fn list_numa_node_ids(&self) -> crate::Result<Option<Vec<NodeId>>> {
        match self {
            Self::Rooted(filesystem) => filesystem.list_numa_node_ids(),
            #[cfg(test)]
            Self::Mock(mock) => mock.list_numa_node_ids(),
        }
    }

    fn list_numa_node_processor_ids(&self, node_id: NodeId) -> crate::Result<Vec<ProcessorId>> {
        match self {
            Self::Rooted(filesystem) => filesystem.list_numa_node_processor_ids(node_id),
            #[cfg(test)]
            Self::Mock(mock) => mock.list_numa_node_processor_ids(node_id),
        }
    }

    fn get_online_processors_contents(&self) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_online_processors_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_online_processors_contents(),
        }
    }

    fn list_processor_ids(&self) -> crate::Result<Vec<ProcessorId>> {
        match self {
            Self::Rooted(filesystem) => filesystem.list_processor_ids(),
            #[cfg(test)]
            Self::Mock(mock) => mock.list_processor_ids(),
        }
    }

    fn get_core_id_contents(&self, processor_id: ProcessorId) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_core_id_contents(processor_id),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_core_id_contents(processor_id),
        }
    }

    fn list_cache_indexes(&self, processor_id: ProcessorId) -> Vec<u32> {
        match self {
            Self::Rooted(filesystem) => filesystem.list_cache_indexes(processor_id),
            #[cfg(test)]
            Self::Mock(mock) => mock.list_cache_indexes(processor_id),
        }
    }

    fn get_cache_attribute_contents(
        &self,
        processor_id: ProcessorId,
        cache_index: u32,
        attribute: CacheAttribute,
    ) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => {
                filesystem.get_cache_attribute_contents(processor_id, cache_index, attribute)
            }
            #[cfg(test)]
            Self::Mock(mock) => {
                mock.get_cache_attribute_contents(processor_id, cache_index, attribute)
            }
        }
    }

    fn get_numa_node_distance_contents(&self, node_id: NodeId) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_numa_node_distance_contents(node_id),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_numa_node_distance_contents(node_id),
        }
    }

    fn get_numa_node_meminfo_contents(&self, node_id: NodeId) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_numa_node_meminfo_contents(node_id),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_numa_node_meminfo_contents(node_id),
        }
    }

    fn get_pci_ids_contents(&self) -> crate::Result<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_pci_ids_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_pci_ids_contents(),
        }
    }

    fn list_pci_device_addresses(&self) -> crate::Result<Vec<String>> {
        match self {
            Self::Rooted(filesystem) => filesystem.list_pci_device_addresses(),
            #[cfg(test)]
            Self::Mock(mock) => mock.list_pci_device_addresses(),
        }
    }

    fn get_pci_device_attribute_contents(
        &self,
        address: &str,
        attribute: PciAttribute,
    ) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => {
                filesystem.get_pci_device_attribute_contents(address, attribute)
            }
            #[cfg(test)]
            Self::Mock(mock) => mock.get_pci_device_attribute_contents(address, attribute),
        }
    }

    fn get_pci_device_driver(&self, address: &str) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_pci_device_driver(address),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_pci_device_driver(address),
        }
    }

    fn list_drm_card_indexes(&self) -> crate::Result<Option<Vec<u32>>> {
        match self {
            Self::Rooted(filesystem) => filesystem.list_drm_card_indexes(),
            #[cfg(test)]
            Self::Mock(mock) => mock.list_drm_card_indexes(),
        }
    }

    fn get_drm_card_pci_address(&self, card_index: u32) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_drm_card_pci_address(card_index),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_drm_card_pci_address(card_index),
        }
    }

    fn list_block_device_names(&self) -> crate::Result<Vec<String>> {
        match self {
            Self::Rooted(filesystem) => filesystem.list_block_device_names(),
            #[cfg(test)]
            Self::Mock(mock) => mock.list_block_device_names(),
        }
    }

    fn get_block_device_link(&self, device: &str) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_block_device_link(device),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_block_device_link(device),
        }
    }

    fn list_block_partition_names(&self, device: &str) -> Vec<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.list_block_partition_names(device),
            #[cfg(test)]
            Self::Mock(mock) => mock.list_block_partition_names(device),
        }
    }

    fn get_block_attribute_contents(
        &self,
        device_path: &str,
        attribute: BlockAttribute,
    ) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => {
                filesystem.get_block_attribute_contents(device_path, attribute)
            }
            #[cfg(test)]
            Self::Mock(mock) => mock.get_block_attribute_contents(device_path, attribute),
        }
    }

    fn get_mounts_contents(&self) -> Option<String> {
        match self {
            Self::Rooted(filesystem) => filesystem.get_mounts_contents(),
            #[cfg(test)]
            Self::Mock(mock) => mock.get_mounts_contents(),
        }
    }
}

impl Debug for FilesystemFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rooted(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
