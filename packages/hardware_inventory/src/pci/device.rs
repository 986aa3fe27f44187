use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::report::NamedRecord;
use crate::{
    Class, DeviceIdentity, NodeId, PciAddress, Product, ProgrammingInterface, ResolvedIdentity,
    Subclass, Vendor,
};

/// A PCI device present on the host, with its identity resolved to names.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PciDevice {
    pub(crate) address: PciAddress,
    pub(crate) identity: DeviceIdentity,
    pub(crate) resolved: ResolvedIdentity,
    pub(crate) revision: String,
    pub(crate) driver: Option<String>,
    pub(crate) node_id: Option<NodeId>,
}

impl PciDevice {
    /// Where the device sits on the bus.
    #[must_use]
    pub const fn address(&self) -> PciAddress {
        self.address
    }

    /// The raw codes identifying the device.
    #[must_use]
    pub const fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// The vendor of the device.
    #[must_use]
    pub fn vendor(&self) -> &Arc<Vendor> {
        self.resolved.vendor()
    }

    /// The product of the device.
    #[must_use]
    pub fn product(&self) -> &Arc<Product> {
        self.resolved.product()
    }

    /// The subsystem (board) the device is built into.
    #[must_use]
    pub fn subsystem(&self) -> &Arc<Product> {
        self.resolved.subsystem()
    }

    /// The device class.
    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        self.resolved.class()
    }

    /// The device subclass.
    #[must_use]
    pub fn subclass(&self) -> &Arc<Subclass> {
        self.resolved.subclass()
    }

    /// The programming interface of the device.
    #[must_use]
    pub fn programming_interface(&self) -> &Arc<ProgrammingInterface> {
        self.resolved.programming_interface()
    }

    /// The hardware revision as the kernel reports it (e.g. `0x04`), or
    /// [`UNKNOWN`][crate::UNKNOWN].
    #[must_use]
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// The name of the kernel driver bound to the device, if any.
    #[must_use]
    pub fn driver(&self) -> Option<&str> {
        self.driver.as_deref()
    }

    /// The NUMA node the device is attached to, if the platform says.
    #[must_use]
    pub const fn node_id(&self) -> Option<NodeId> {
        self.node_id
    }
}

#[derive(Serialize)]
struct SubsystemRecord<'a> {
    vendor_id: &'a str,
    id: &'a str,
    name: &'a str,
}

impl Serialize for PciDevice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PciDevice", 10)?;
        state.serialize_field("address", &self.address)?;
        state.serialize_field(
            "vendor",
            &NamedRecord {
                id: self.vendor().id(),
                name: self.vendor().name(),
            },
        )?;
        state.serialize_field(
            "product",
            &NamedRecord {
                id: self.product().id(),
                name: self.product().name(),
            },
        )?;
        state.serialize_field(
            "subsystem",
            &SubsystemRecord {
                vendor_id: self.subsystem().vendor_id(),
                id: self.subsystem().id(),
                name: self.subsystem().name(),
            },
        )?;
        state.serialize_field(
            "class",
            &NamedRecord {
                id: self.class().id(),
                name: self.class().name(),
            },
        )?;
        state.serialize_field(
            "subclass",
            &NamedRecord {
                id: self.subclass().id(),
                name: self.subclass().name(),
            },
        )?;
        state.serialize_field(
            "programming_interface",
            &NamedRecord {
                id: self.programming_interface().id(),
                name: self.programming_interface().name(),
            },
        )?;
        state.serialize_field("revision", &self.revision)?;
        state.serialize_field("driver", &self.driver)?;
        state.serialize_field("node_id", &self.node_id)?;
        state.end()
    }
}
