use std::sync::Arc;

use crate::{Class, DeviceIdentity, PciDatabase, Product, ProgrammingInterface, Subclass, Vendor};

/// The database records that name each part of a [`DeviceIdentity`].
///
/// Every field is always present. A code the database does not know resolves to a placeholder
/// record that carries the original code and the name [`UNKNOWN`][crate::UNKNOWN]. Records that
/// were found are shared with the database.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedIdentity {
    vendor: Arc<Vendor>,
    product: Arc<Product>,
    subsystem: Arc<Product>,
    class: Arc<Class>,
    subclass: Arc<Subclass>,
    programming_interface: Arc<ProgrammingInterface>,
}

impl ResolvedIdentity {
    /// The vendor of the device.
    #[must_use]
    pub const fn vendor(&self) -> &Arc<Vendor> {
        &self.vendor
    }

    /// The product of the device.
    #[must_use]
    pub const fn product(&self) -> &Arc<Product> {
        &self.product
    }

    /// The subsystem (board) the device is built into.
    #[must_use]
    pub const fn subsystem(&self) -> &Arc<Product> {
        &self.subsystem
    }

    /// The device class.
    #[must_use]
    pub const fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// The device subclass.
    #[must_use]
    pub const fn subclass(&self) -> &Arc<Subclass> {
        &self.subclass
    }

    /// The programming interface of the device.
    #[must_use]
    pub const fn programming_interface(&self) -> &Arc<ProgrammingInterface> {
        &self.programming_interface
    }
}

impl PciDatabase {
    /// Names every part of a device identity, falling back to placeholders for unknown codes.
    ///
    /// # Example
    ///
    /// ```
    /// use hardware_inventory::{DeviceIdentity, PciDatabase, UNKNOWN};
    ///
    /// let database = PciDatabase::parse("8086  Intel Corporation\n");
    /// let identity =
    ///     DeviceIdentity::decode("pci:v00008086d00001C02sv00001028sd000004A9bc01sc06i01")
    ///         .unwrap();
    ///
    /// let resolved = database.resolve(&identity);
    ///
    /// assert_eq!(resolved.vendor().name(), "Intel Corporation");
    /// assert_eq!(resolved.product().name(), UNKNOWN);
    /// assert_eq!(resolved.product().id(), "1c02");
    /// ```
    #[must_use]
    pub fn resolve(&self, identity: &DeviceIdentity) -> ResolvedIdentity {
        let vendor = self.vendor(identity.vendor()).map_or_else(
            || Arc::new(Vendor::unknown(identity.vendor())),
            Arc::clone,
        );

        let product = self.product(identity.vendor(), identity.product());

        // A subsystem is only named if both the product and the subsystem vendor are known.
        // The first subsystem of the product with the same subsystem product ID wins.
        let subsystem = product
            .filter(|_| self.vendor(identity.subsystem_vendor()).is_some())
            .and_then(|product| {
                product
                    .subsystems()
                    .iter()
                    .find(|subsystem| subsystem.id() == identity.subsystem_product())
            })
            .map_or_else(
                || {
                    Arc::new(Product::unknown(
                        identity.subsystem_vendor(),
                        identity.subsystem_product(),
                    ))
                },
                Arc::clone,
            );

        let product = product.map_or_else(
            || Arc::new(Product::unknown(identity.vendor(), identity.product())),
            Arc::clone,
        );

        let class = self.class(identity.class());

        let subclass = class.and_then(|class| {
            class
                .subclasses()
                .iter()
                .find(|subclass| subclass.id() == identity.subclass())
        });

        let programming_interface = subclass.and_then(|subclass| {
            subclass
                .programming_interfaces()
                .iter()
                .find(|interface| interface.id() == identity.programming_interface())
        });

        ResolvedIdentity {
            vendor,
            product,
            subsystem,
            class: class.map_or_else(|| Arc::new(Class::unknown(identity.class())), Arc::clone),
            subclass: subclass
                .map_or_else(|| Arc::new(Subclass::unknown(identity.subclass())), Arc::clone),
            programming_interface: programming_interface.map_or_else(
                || {
                    Arc::new(ProgrammingInterface::unknown(
                        identity.programming_interface(),
                    ))
                },
                Arc::clone,
            ),
        }
    }
}
