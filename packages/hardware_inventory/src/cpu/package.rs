use std::collections::BTreeSet;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::{Core, PackageId};

/// A physical processor package (socket) with its cores.
///
/// The totals are derived from the cores that were actually discovered. The counts reported by
/// the operating system are kept separately because virtualized or partially offline systems
/// often report counts that do not match what is visible.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Package {
    pub(crate) id: PackageId,
    pub(crate) vendor: String,
    pub(crate) model: String,
    pub(crate) capabilities: BTreeSet<String>,
    pub(crate) reported_cores: Option<u32>,
    pub(crate) reported_threads: Option<u32>,
    pub(crate) cores: Vec<Core>,
}

impl Package {
    /// The package ID assigned by the operating system.
    #[must_use]
    pub const fn id(&self) -> PackageId {
        self.id
    }

    /// The vendor ID string, e.g. `GenuineIntel`, or [`UNKNOWN`][crate::UNKNOWN].
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// The marketing name of the processor model, or [`UNKNOWN`][crate::UNKNOWN].
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The feature flags of the processor, e.g. `sse4_2` or `avx2`.
    #[must_use]
    pub const fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    /// The cores of the package in discovery order.
    #[must_use]
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// The number of cores discovered in this package.
    #[must_use]
    pub fn total_cores(&self) -> usize {
        self.cores.len()
    }

    /// The number of hardware threads discovered in this package.
    #[must_use]
    pub fn total_threads(&self) -> usize {
        self.cores.iter().map(Core::total_threads).sum()
    }

    /// The number of cores the operating system says the package has, if it says.
    #[must_use]
    pub const fn reported_cores(&self) -> Option<u32> {
        self.reported_cores
    }

    /// The number of hardware threads the operating system says the package has, if it says.
    #[must_use]
    pub const fn reported_threads(&self) -> Option<u32> {
        self.reported_threads
    }

    /// Describes each disagreement between the reported and the derived totals.
    pub(crate) fn total_mismatches(&self) -> Vec<String> {
        let mut mismatches = Vec::new();

        if let Some(reported) = self.reported_cores {
            if usize::try_from(reported).ok() != Some(self.total_cores()) {
                mismatches.push(format!(
                    "package {} reports {reported} cores but {} were found",
                    self.id,
                    self.total_cores()
                ));
            }
        }

        if let Some(reported) = self.reported_threads {
            if usize::try_from(reported).ok() != Some(self.total_threads()) {
                mismatches.push(format!(
                    "package {} reports {reported} threads but {} were found",
                    self.id,
                    self.total_threads()
                ));
            }
        }

        mismatches
    }
}

impl Serialize for Package {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Package", 9)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("vendor", &self.vendor)?;
        state.serialize_field("model", &self.model)?;
        state.serialize_field("total_cores", &self.total_cores())?;
        state.serialize_field("total_threads", &self.total_threads())?;
        state.serialize_field("reported_cores", &self.reported_cores)?;
        state.serialize_field("reported_threads", &self.reported_threads)?;
        state.serialize_field("capabilities", &self.capabilities)?;
        state.serialize_field("cores", &self.cores)?;
        state.end()
    }
}
