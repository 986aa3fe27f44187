mod builder;
mod cache;
mod node;

pub use cache::{CacheType, MemoryCache};
pub use node::{Architecture, NodeMemory, TopologyNode};

use serde::Serialize;

use crate::error::ensure_supported;
use crate::pal::FilesystemFacade;
use crate::{Category, Diagnostics, Options, Report};

/// The NUMA nodes of the host, with the cores and memory caches of each.
///
/// Built from `/sys/devices/system/node` and `/sys/devices/system/cpu`. A host whose kernel
/// exposes no NUMA nodes is reported as a single SMP node.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TopologyInfo {
    architecture: Architecture,
    nodes: Vec<TopologyNode>,
}

impl TopologyInfo {
    /// Takes inventory of the NUMA topology of the host described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`][crate::Error::UnsupportedPlatform] on platforms
    /// without the Linux virtual filesystem and
    /// [`Error::SourceUnavailable`][crate::Error::SourceUnavailable] if a node directory or the
    /// processor directory cannot be listed.
    pub fn load(options: &Options) -> crate::Result<Self> {
        ensure_supported(Category::Topology)?;

        Self::from_filesystem(&options.filesystem(), options.diagnostics())
    }

    pub(crate) fn from_filesystem(
        fs: &FilesystemFacade,
        diagnostics: &dyn Diagnostics,
    ) -> crate::Result<Self> {
        let nodes = builder::build_nodes(fs, diagnostics)?;

        Ok(Self {
            architecture: Architecture::from_node_count(nodes.len()),
            nodes,
        })
    }

    /// Whether the host has one memory region (SMP) or several (NUMA).
    #[must_use]
    pub const fn architecture(&self) -> Architecture {
        self.architecture
    }

    /// The nodes of the host, ascending by ID. Never empty.
    #[must_use]
    pub fn nodes(&self) -> &[TopologyNode] {
        &self.nodes
    }
}

impl Report for TopologyInfo {
    const CATEGORY: Category = Category::Topology;
}
