use derive_more::derive::Display;
use nonempty::NonEmpty;

/// Identifies a specific logical processor (hardware thread).
///
/// This will match the numeric identifier used by standard tooling of the operating system.
///
/// It is important to highlight that the values used are not guaranteed to be sequential/contiguous
/// or to start from zero (aspects that are also not guaranteed by operating system tooling).
pub type ProcessorId = u32;

/// Identifies a physical core within its package.
///
/// Core identifiers are assigned by the operating system and are frequently sparse, e.g. a
/// package with 8 cores may report core IDs 0-3 and 8-11.
pub type CoreId = u32;

/// Identifies a physical processor package (socket).
pub type PackageId = u32;

/// Identifies a NUMA node (memory region).
pub type NodeId = u32;

/// Name given to any record whose real name could not be determined.
pub const UNKNOWN: &str = "unknown";

/// The inventory categories exposed by this package.
///
/// The lower-case display form doubles as the top-level key when a report is serialized.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Category {
    /// Processor packages, cores and hardware threads.
    #[display("cpu")]
    Cpu,

    /// NUMA nodes with their cores and memory caches.
    #[display("topology")]
    Topology,

    /// PCI devices resolved against the PCI ID database.
    #[display("pci")]
    Pci,

    /// Graphics cards and their PCI devices.
    #[display("gpu")]
    Gpu,

    /// Disks, their partitions and where those are mounted.
    #[display("block")]
    Block,
}

impl Category {
    /// The key under which a report of this category is wrapped when serialized.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Topology => "topology",
            Self::Pci => "pci",
            Self::Gpu => "gpu",
            Self::Block => "block",
        }
    }
}

/// Sorts a set of processor IDs ascending and removes duplicates.
pub(crate) fn sorted_unique(processors: NonEmpty<ProcessorId>) -> NonEmpty<ProcessorId> {
    let NonEmpty { head, mut tail } = processors;

    tail.push(head);
    tail.sort_unstable();
    tail.dedup();

    // We pushed one item above, so there is always something to remove.
    let head = tail.remove(0);

    NonEmpty { head, tail }
}

#[cfg(test)]
mod tests {
    use nonempty::nonempty;

    use super::*;

    #[test]
    fn sorted_unique_sorts_and_dedups() {
        let sorted = sorted_unique(nonempty![5, 1, 3, 1, 5]);
        assert_eq!(sorted, nonempty![1, 3, 5]);
    }

    #[test]
    fn sorted_unique_single_item() {
        assert_eq!(sorted_unique(nonempty![7]), nonempty![7]);
    }

    #[test]
    fn category_key_matches_display() {
        for category in [
            Category::Cpu,
            Category::Topology,
            Category::Pci,
            Category::Gpu,
            Category::Block,
        ] {
            assert_eq!(category.key(), category.to_string());
        }
    }
}
