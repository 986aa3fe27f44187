mod hierarchy;
mod package;
mod physical_core;
mod records;

pub use package::*;
pub use physical_core::*;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::ensure_supported;
use crate::pal::{Filesystem, FilesystemFacade};
use crate::{Category, Diagnostics, Options, Report};

/// The processor packages of the host, with their cores and hardware threads.
///
/// Built from `/proc/cpuinfo`. If that file cannot be read, the result is empty rather than an
/// error (a warning is emitted).
///
/// # Example
///
/// ```
/// use hardware_inventory::{CpuInfo, SilentDiagnostics};
///
/// let cpu = CpuInfo::from_cpuinfo(
///     "processor : 0\nphysical id : 0\ncore id : 0\n\n\
///      processor : 1\nphysical id : 0\ncore id : 0\n",
///     &SilentDiagnostics::default(),
/// );
///
/// assert_eq!(cpu.total_cores(), 1);
/// assert_eq!(cpu.total_threads(), 2);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CpuInfo {
    packages: Vec<Package>,
}

impl CpuInfo {
    /// Takes inventory of the processors of the host described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`][crate::Error::UnsupportedPlatform] if the
    /// current platform does not expose `/proc/cpuinfo`.
    pub fn load(options: &Options) -> crate::Result<Self> {
        ensure_supported(Category::Cpu)?;

        Ok(Self::from_filesystem(
            &options.filesystem(),
            options.diagnostics(),
        ))
    }

    /// Builds the processor inventory from the text of a `/proc/cpuinfo` style file.
    #[must_use]
    pub fn from_cpuinfo(text: &str, diagnostics: &dyn Diagnostics) -> Self {
        let records = records::parse_processor_records(text);

        tracing::debug!(records = records.len(), "parsed processor records");

        Self {
            packages: hierarchy::build_packages(&records, diagnostics),
        }
    }

    pub(crate) fn from_filesystem(fs: &FilesystemFacade, diagnostics: &dyn Diagnostics) -> Self {
        let Some(text) = fs.get_cpuinfo_contents() else {
            diagnostics.warn("/proc/cpuinfo could not be read; no processors are listed");
            return Self {
                packages: Vec::new(),
            };
        };

        Self::from_cpuinfo(&text, diagnostics)
    }

    /// The processor packages, ascending by ID.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// The number of cores across all packages.
    #[must_use]
    pub fn total_cores(&self) -> usize {
        self.packages.iter().map(Package::total_cores).sum()
    }

    /// The number of hardware threads across all packages.
    #[must_use]
    pub fn total_threads(&self) -> usize {
        self.packages.iter().map(Package::total_threads).sum()
    }
}

impl Serialize for CpuInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CpuInfo", 3)?;
        state.serialize_field("total_cores", &self.total_cores())?;
        state.serialize_field("total_threads", &self.total_threads())?;
        state.serialize_field("packages", &self.packages)?;
        state.end()
    }
}

impl Report for CpuInfo {
    const CATEGORY: Category = Category::Cpu;
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::SilentDiagnostics;
    use crate::diagnostics::MockDiagnostics;
    use crate::pal::MockFilesystem;

    assert_impl_all!(CpuInfo: Send, Sync, Debug, Clone);
    assert_impl_all!(Package: Send, Sync, Debug, Clone);
    assert_impl_all!(Core: Send, Sync, Debug, Clone);

    const TWO_SOCKETS: &str = "\
processor : 0
vendor_id : AuthenticAMD
model name : AMD EPYC 7763
physical id : 0
core id : 0
cpu cores : 2
siblings : 4
flags : fpu sse avx

processor : 1
vendor_id : AuthenticAMD
model name : AMD EPYC 7763
physical id : 0
core id : 1
cpu cores : 2
siblings : 4

processor : 2
physical id : 0
core id : 0

processor : 3
physical id : 0
core id : 1

processor : 4
vendor_id : AuthenticAMD
physical id : 1
core id : 0

processor : 5
physical id : 1
core id : 0
";

    fn mock_with_cpuinfo(contents: Option<&'static str>) -> FilesystemFacade {
        let mut fs = MockFilesystem::new();
        fs.expect_get_cpuinfo_contents()
            .times(1)
            .returning(move || contents.map(ToString::to_string));

        FilesystemFacade::from_mock(fs)
    }

    #[test]
    fn totals_aggregate_over_packages() {
        let cpu = CpuInfo::from_filesystem(
            &mock_with_cpuinfo(Some(TWO_SOCKETS)),
            &SilentDiagnostics,
        );

        assert_eq!(cpu.packages().len(), 2);
        assert_eq!(cpu.total_cores(), 3);
        assert_eq!(cpu.total_threads(), 6);
        assert_eq!(
            cpu.packages().iter().map(Package::total_threads).sum::<usize>(),
            cpu.total_threads()
        );
    }

    #[test]
    fn unreadable_cpuinfo_is_empty_with_warning() {
        let mut diagnostics = MockDiagnostics::new();
        diagnostics.expect_warn().times(1).return_const(());

        let cpu = CpuInfo::from_filesystem(&mock_with_cpuinfo(None), &diagnostics);

        assert!(cpu.packages().is_empty());
        assert_eq!(cpu.total_threads(), 0);
    }

    #[test]
    fn json_is_wrapped_and_complete() {
        let cpu = CpuInfo::from_cpuinfo(TWO_SOCKETS, &SilentDiagnostics);

        let json: serde_json::Value = serde_json::from_str(&cpu.to_json().unwrap()).unwrap();

        assert_eq!(json["cpu"]["total_threads"], 6);
        assert_eq!(json["cpu"]["packages"][0]["model"], "AMD EPYC 7763");
        assert_eq!(json["cpu"]["packages"][0]["reported_threads"], 4);
        assert_eq!(
            json["cpu"]["packages"][0]["capabilities"],
            serde_json::json!(["avx", "fpu", "sse"])
        );
        assert_eq!(
            json["cpu"]["packages"][0]["cores"][1]["logical_processors"],
            serde_json::json!([1, 3])
        );
        assert_eq!(json["cpu"]["packages"][1]["model"], "unknown");
        assert!(json["cpu"]["packages"][1]["reported_cores"].is_null());
    }

    #[test]
    fn yaml_is_wrapped() {
        let cpu = CpuInfo::from_cpuinfo(TWO_SOCKETS, &SilentDiagnostics);

        let yaml = cpu.to_yaml().unwrap();

        assert!(yaml.starts_with("cpu:\n"), "{yaml}");
    }
}
