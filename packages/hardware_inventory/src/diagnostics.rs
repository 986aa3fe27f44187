use std::fmt::Debug;

/// Receives warnings about data that was missing or malformed and therefore degraded.
///
/// Inventory is best-effort: a single unreadable attribute does not fail the whole category.
/// Instead, the affected field falls back to an "unknown" or empty value and a warning is sent
/// here. Supply your own implementation via [`Options::with_diagnostics()`][1] to collect
/// or silence these warnings.
///
/// [1]: crate::Options::with_diagnostics
#[cfg_attr(test, mockall::automock)]
pub trait Diagnostics: Debug + Send + Sync {
    /// Reports a condition that degraded the inventory without failing it.
    fn warn(&self, message: &str);
}

/// Forwards warnings to the `tracing` ecosystem at the `WARN` level.
///
/// This is the default diagnostic sink.
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Discards all warnings.
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn warn(&self, _message: &str) {}
}
