use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::pal::FilesystemFacade;
use crate::{Diagnostics, SilentDiagnostics, TracingDiagnostics};

/// Environment variable that redirects all reads to an alternate root directory.
pub const ROOT_ENV_VAR: &str = "HWINV_ROOT";

/// Environment variable naming an explicit `pci.ids` file to use as the PCI ID database.
pub const PCI_IDS_ENV_VAR: &str = "HWINV_PCI_IDS";

/// Environment variable that silences all warnings when set to a non-empty value.
pub const DISABLE_WARNINGS_ENV_VAR: &str = "HWINV_DISABLE_WARNINGS";

/// Configures where and how inventory data is read.
///
/// The defaults read the real host via `/` and forward warnings to `tracing`. Pointing the
/// root elsewhere allows inspecting an alternate mounted view of a host, such as a snapshot of
/// `/proc` and `/sys` or the host filesystem bind-mounted into a container.
///
/// # Example
///
/// ```
/// use hardware_inventory::{Options, SilentDiagnostics};
///
/// let options = Options::new()
///     .with_root("/host")
///     .with_diagnostics(SilentDiagnostics::default());
///
/// assert_eq!(options.root(), std::path::Path::new("/host"));
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    root: PathBuf,
    pci_ids_path: Option<PathBuf>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Options {
    /// Creates options that read the real host and forward warnings to `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/"),
            pci_ids_path: None,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Creates options from the `HWINV_*` environment variables, using the defaults of
    /// [`new()`][Self::new] for anything not set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().overridden_by(|name| env::var(name).ok())
    }

    fn overridden_by(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
            self = self.with_root(root);
        }

        if let Some(path) = lookup(PCI_IDS_ENV_VAR).filter(|v| !v.is_empty()) {
            self = self.with_pci_ids_path(path);
        }

        if lookup(DISABLE_WARNINGS_ENV_VAR).is_some_and(|v| !v.is_empty()) {
            self = self.with_diagnostics(SilentDiagnostics);
        }

        self
    }

    /// Redirects all reads to paths relative to `root` instead of `/`.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Uses the `pci.ids` file at `path` instead of searching the well-known locations.
    ///
    /// The path is used as-is and is not joined onto the root.
    #[must_use]
    pub fn with_pci_ids_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pci_ids_path = Some(path.into());
        self
    }

    /// Sends warnings to `diagnostics` instead of `tracing`.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Arc::new(diagnostics);
        self
    }

    /// The root directory that all reads are relative to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The explicitly configured `pci.ids` path, if any.
    #[must_use]
    pub fn pci_ids_path(&self) -> Option<&Path> {
        self.pci_ids_path.as_deref()
    }

    /// The sink that receives warnings.
    #[must_use]
    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    pub(crate) fn shared_diagnostics(&self) -> Arc<dyn Diagnostics> {
        Arc::clone(&self.diagnostics)
    }

    pub(crate) fn filesystem(&self) -> FilesystemFacade {
        FilesystemFacade::rooted(self.root.clone(), self.pci_ids_path.clone())
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use foldhash::HashMap;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::diagnostics::MockDiagnostics;

    assert_impl_all!(Options: Send, Sync, Clone);

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();

        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_read_real_root() {
        let options = Options::new();

        assert_eq!(options.root(), Path::new("/"));
        assert!(options.pci_ids_path().is_none());
    }

    /// Options whose diagnostics expect exactly `warnings` warnings before being dropped.
    fn expecting_warnings(warnings: usize) -> Options {
        let mut diagnostics = MockDiagnostics::new();
        diagnostics.expect_warn().times(warnings).return_const(());

        Options::new().with_diagnostics(diagnostics)
    }

    #[test]
    fn lookup_without_variables_changes_nothing() {
        let options = expecting_warnings(1).overridden_by(lookup_from(&[]));

        assert_eq!(options.root(), Path::new("/"));
        assert!(options.pci_ids_path().is_none());

        options.diagnostics().warn("still reaches the configured sink");
    }

    #[test]
    fn lookup_applies_variables() {
        let options = expecting_warnings(0).overridden_by(lookup_from(&[
            (ROOT_ENV_VAR, "/host"),
            (PCI_IDS_ENV_VAR, "/tmp/pci.ids"),
            (DISABLE_WARNINGS_ENV_VAR, "1"),
        ]));

        assert_eq!(options.root(), Path::new("/host"));
        assert_eq!(options.pci_ids_path(), Some(Path::new("/tmp/pci.ids")));

        options.diagnostics().warn("silenced");
    }

    #[test]
    fn empty_variables_are_ignored() {
        let options = expecting_warnings(1).overridden_by(lookup_from(&[
            (ROOT_ENV_VAR, ""),
            (DISABLE_WARNINGS_ENV_VAR, ""),
        ]));

        assert_eq!(options.root(), Path::new("/"));

        options.diagnostics().warn("not silenced");
    }
}
