use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::Category;

/// Errors that can occur when taking inventory of the hardware.
///
/// Only failures that make an entire inventory category unavailable are reported as errors.
/// Finer-grained problems (a single unreadable attribute, an unparsable number) are absorbed
/// and reflected in the shape of the returned data, with a warning sent to the
/// [diagnostic sink][crate::Diagnostics].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The category has no implementation on the current operating system.
    #[error("{category} inventory is not supported on this platform")]
    UnsupportedPlatform {
        /// The category that was requested.
        category: Category,
    },

    /// A file or directory that the category cannot do without could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    SourceUnavailable {
        /// The path that could not be read, including any alternate root.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A report could not be rendered in the requested format.
    #[error("failed to render {category} report as {format}: {problem}")]
    Serialization {
        /// The category of the report being rendered.
        category: Category,

        /// The name of the output format.
        format: &'static str,

        /// A human-readable description of the problem.
        problem: String,
    },
}

impl Error {
    pub(crate) fn source_unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// A specialized `Result` type for inventory operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::UnsupportedPlatform`] unless the build target exposes the Linux
/// virtual filesystem that all inventory categories are read from.
pub(crate) fn ensure_supported(category: Category) -> Result<()> {
    if cfg!(target_os = "linux") {
        Ok(())
    } else {
        Err(Error::UnsupportedPlatform { category })
    }
}
