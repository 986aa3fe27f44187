use nonempty::NonEmpty;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::{Category, Error, ProcessorId};

/// A top-level inventory result that can be rendered as a structured document.
///
/// The payload is always wrapped in an object with a single key naming the category, so the
/// output of `CpuInfo` looks like `{"cpu": {...}}` and the output of `TopologyInfo` looks like
/// `{"topology": {...}}`.
///
/// # Example
///
/// ```
/// use hardware_inventory::{CpuInfo, Report, SilentDiagnostics};
///
/// let cpu = CpuInfo::from_cpuinfo(
///     "processor : 0\nphysical id : 0\ncore id : 0\n",
///     &SilentDiagnostics::default(),
/// );
///
/// let json = cpu.to_json().unwrap();
/// assert!(json.starts_with(r#"{"cpu":"#));
/// ```
pub trait Report: Serialize {
    /// The category of the report, which provides the wrapping key.
    const CATEGORY: Category;

    /// Renders the report as compact JSON.
    fn to_json(&self) -> crate::Result<String>
    where
        Self: Sized,
    {
        serde_json::to_string(&Wrapped::new(self))
            .map_err(|e| serialization_error::<Self>("JSON", &e))
    }

    /// Renders the report as indented JSON.
    fn to_json_pretty(&self) -> crate::Result<String>
    where
        Self: Sized,
    {
        serde_json::to_string_pretty(&Wrapped::new(self))
            .map_err(|e| serialization_error::<Self>("JSON", &e))
    }

    /// Renders the report as YAML.
    fn to_yaml(&self) -> crate::Result<String>
    where
        Self: Sized,
    {
        serde_yaml::to_string(&Wrapped::new(self))
            .map_err(|e| serialization_error::<Self>("YAML", &e))
    }
}

fn serialization_error<R: Report>(format: &'static str, error: &impl ToString) -> Error {
    Error::Serialization {
        category: R::CATEGORY,
        format,
        problem: error.to_string(),
    }
}

/// Wraps a report under its category key.
struct Wrapped<'a, R> {
    report: &'a R,
}

impl<'a, R: Report> Wrapped<'a, R> {
    const fn new(report: &'a R) -> Self {
        Self { report }
    }
}

impl<R: Report> Serialize for Wrapped<'_, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(R::CATEGORY.key(), self.report)?;
        map.end()
    }
}

/// Serializes a non-empty set of processor IDs as a plain sequence.
pub(crate) struct ProcessorList<'a>(pub(crate) &'a NonEmpty<ProcessorId>);

impl Serialize for ProcessorList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// Serializes an identified, named record as `{"id": ..., "name": ...}`.
#[derive(Serialize)]
pub(crate) struct NamedRecord<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
}
