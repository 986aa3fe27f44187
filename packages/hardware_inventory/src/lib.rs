//! Takes inventory of the hardware of a Linux host by reading the files the kernel exposes under
//! `/proc` and `/sys`, together with the `pci.ids` naming database.
//!
//! The inventory is split into categories, each loaded independently:
//!
//! * [`CpuInfo`] - processor packages, their cores and the hardware threads of each core.
//! * [`TopologyInfo`] - NUMA nodes, the cores of each node and the memory caches they share.
//! * [`PciInfo`] - PCI devices with vendor, product and class names.
//! * [`GpuInfo`] - graphics cards and the PCI devices behind them.
//! * [`BlockInfo`] - disks with their drive, controller and bus types, and their partitions.
//!
//! ```no_run
//! use hardware_inventory::{CpuInfo, Options, Report, TopologyInfo};
//!
//! let options = Options::from_env();
//!
//! let cpu = CpuInfo::load(&options)?;
//! println!("{} cores, {} threads", cpu.total_cores(), cpu.total_threads());
//!
//! let topology = TopologyInfo::load(&options)?;
//! println!("{}", topology.to_yaml()?);
//! # Ok::<(), hardware_inventory::Error>(())
//! ```
//!
//! # Alternate roots
//!
//! All reads are relative to a configurable root directory (see [`Options::with_root()`]), so
//! the inventory of another host can be taken from a copy or bind-mount of its `/proc` and
//! `/sys` trees.
//!
//! # Best effort
//!
//! Only failures that make a whole category unavailable are returned as [`Error`]. Missing or
//! malformed details degrade the affected fields to [`UNKNOWN`], zero or absent values and are
//! reported to the [`Diagnostics`] sink, which forwards them to `tracing` by default.
//!
//! # Platform support
//!
//! The category entry points return [`Error::UnsupportedPlatform`] on operating systems other
//! than Linux.

mod block;
mod cpu;
mod diagnostics;
mod error;
mod gpu;
mod options;
mod pal;
mod pci;
mod primitive_types;
mod report;
mod topology;

pub use block::*;
pub use cpu::*;
pub use diagnostics::*;
pub use error::{Error, Result};
pub use gpu::*;
pub use options::*;
pub use pci::*;
pub use primitive_types::{Category, CoreId, NodeId, PackageId, ProcessorId, UNKNOWN};
pub use report::Report;
pub use topology::*;
