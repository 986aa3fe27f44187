use derive_more::derive::Display;
use serde::Serialize;

use crate::{Core, MemoryCache, NodeId};

/// How the memory of the host is organized.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// Symmetric multiprocessing: all processors share a single memory region.
    #[display("smp")]
    Smp,

    /// Non-uniform memory access: there are multiple memory regions (NUMA nodes) and the cost
    /// of accessing memory depends on which node a processor belongs to.
    #[display("numa")]
    Numa,
}

impl Architecture {
    pub(crate) const fn from_node_count(count: usize) -> Self {
        if count == 1 { Self::Smp } else { Self::Numa }
    }
}

/// The memory attached to a NUMA node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct NodeMemory {
    total_bytes: u64,
}

impl NodeMemory {
    pub(crate) const fn new(total_bytes: u64) -> Self {
        Self { total_bytes }
    }

    /// The amount of memory attached to the node.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

/// A NUMA node: a group of processors with the memory and caches closest to them.
///
/// On a host without NUMA there is exactly one node that holds everything.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TopologyNode {
    pub(crate) id: NodeId,
    pub(crate) cores: Vec<Core>,
    pub(crate) caches: Vec<MemoryCache>,
    pub(crate) distances: Vec<u32>,
    pub(crate) memory: Option<NodeMemory>,
}

impl TopologyNode {
    /// The node ID assigned by the operating system.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The cores whose hardware threads belong to this node, in discovery order.
    #[must_use]
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// The distinct memory caches used by the processors of this node.
    ///
    /// Ordered by level, then type (unified, instruction, data), then lowest sharing processor.
    /// Empty if no processor of the node exposes cache information.
    #[must_use]
    pub fn caches(&self) -> &[MemoryCache] {
        &self.caches
    }

    /// Relative distances from this node to every node, indexed by node ID.
    ///
    /// Empty if the operating system does not report distances.
    #[must_use]
    pub fn distances(&self) -> &[u32] {
        &self.distances
    }

    /// The memory attached to this node, if it could be determined.
    #[must_use]
    pub const fn memory(&self) -> Option<&NodeMemory> {
        self.memory.as_ref()
    }
}
