use nonempty::NonEmpty;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::report::ProcessorList;
use crate::{CoreId, ProcessorId};

/// A physical core and the hardware threads (logical processors) that run on it.
///
/// Cores appear both in a processor [`Package`][crate::Package] and, re-derived from the
/// node-local view, in a [`TopologyNode`][crate::TopologyNode].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Core {
    id: CoreId,
    index: usize,
    logical_processors: NonEmpty<ProcessorId>,
}

impl Core {
    pub(crate) const fn new(id: CoreId, index: usize, first: ProcessorId) -> Self {
        Self {
            id,
            index,
            logical_processors: NonEmpty::new(first),
        }
    }

    /// Records another hardware thread of this core. Repeated sightings are ignored.
    pub(crate) fn add_logical_processor(&mut self, processor_id: ProcessorId) {
        if !self.logical_processors.contains(&processor_id) {
            self.logical_processors.push(processor_id);
        }
    }

    pub(crate) fn sort_logical_processors(&mut self) {
        self.logical_processors.sort();
    }

    /// The core ID assigned by the operating system.
    ///
    /// These are not dense: sibling cores of one package may have IDs such as 0, 1, 8, 9.
    #[must_use]
    pub const fn id(&self) -> CoreId {
        self.id
    }

    /// Zero-based position of the core in discovery order within its package or node.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The logical processors of the core, ascending.
    #[must_use]
    pub const fn logical_processors(&self) -> &NonEmpty<ProcessorId> {
        &self.logical_processors
    }

    /// The number of hardware threads of the core.
    #[must_use]
    pub fn total_threads(&self) -> usize {
        self.logical_processors.len()
    }
}

impl Serialize for Core {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Core", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("total_threads", &self.total_threads())?;
        state.serialize_field(
            "logical_processors",
            &ProcessorList(&self.logical_processors),
        )?;
        state.end()
    }
}
