//! Platform Abstraction Layer (PAL). This is private API.
//!
//! Everything this package knows about the host it learns by reading the Linux virtual
//! filesystem (`/proc` and `/sys`) and the PCI ID database. The layer follows the three-layer
//! approach of abstraction (trait) → facade (enum) → real implementation, so the builders can
//! be exercised against a mock filesystem in unit tests.

mod filesystem;

pub(crate) use filesystem::*;
