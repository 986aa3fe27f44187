mod address;
mod database;
mod device;
mod identity;
mod resolver;

pub use address::*;
pub use database::*;
pub use device::*;
pub use identity::*;
pub use resolver::*;

use std::sync::Arc;

use serde::Serialize;

use crate::error::ensure_supported;
use crate::pal::{Filesystem, FilesystemFacade, PciAttribute};
use crate::{Category, Diagnostics, NodeId, Options, Report, UNKNOWN};

/// Describes the PCI devices of a host, resolving their identities against a loaded PCI ID
/// database.
///
/// Loading the database is the expensive part, so keep the inventory around if you describe
/// many devices. Cloning is cheap and clones share the database.
#[derive(Clone, Debug)]
pub struct PciInventory {
    fs: FilesystemFacade,
    database: Arc<PciDatabase>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl PciInventory {
    /// Loads the PCI ID database of the host described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`][crate::Error::UnsupportedPlatform] on platforms
    /// without the Linux virtual filesystem and
    /// [`Error::SourceUnavailable`][crate::Error::SourceUnavailable] if no PCI ID database can
    /// be read.
    pub fn new(options: &Options) -> crate::Result<Self> {
        ensure_supported(Category::Pci)?;

        let fs = options.filesystem();
        let database = PciDatabase::from_filesystem(&fs)?;

        Ok(Self::from_parts(
            fs,
            Arc::new(database),
            options.shared_diagnostics(),
        ))
    }

    pub(crate) fn from_parts(
        fs: FilesystemFacade,
        database: Arc<PciDatabase>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            fs,
            database,
            diagnostics,
        }
    }

    /// The PCI ID database that device identities are resolved against.
    #[must_use]
    pub const fn database(&self) -> &Arc<PciDatabase> {
        &self.database
    }

    /// Describes the device at a PCI address such as `0000:00:1f.2` or `00:1f.2`.
    ///
    /// Returns `None` if the address is malformed, if there is no such device or if the kernel
    /// does not expose a usable identity for it.
    #[must_use]
    pub fn describe_device(&self, address: &str) -> Option<PciDevice> {
        let Some(address) = PciAddress::parse(address) else {
            self.diagnostics
                .warn(&format!("'{address}' is not a valid PCI address"));
            return None;
        };

        let sysfs_name = address.to_string();

        let Some(modalias) = self
            .fs
            .get_pci_device_attribute_contents(&sysfs_name, PciAttribute::Modalias)
        else {
            tracing::debug!(%address, "no modalias for PCI device");
            return None;
        };

        let Some(identity) = DeviceIdentity::decode(&modalias) else {
            self.diagnostics.warn(&format!(
                "PCI device {address} has an unrecognized modalias: {}",
                modalias.trim()
            ));
            return None;
        };

        let revision = self
            .fs
            .get_pci_device_attribute_contents(&sysfs_name, PciAttribute::Revision)
            .map(|revision| revision.trim().to_string())
            .filter(|revision| !revision.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());

        // The kernel writes -1 when the platform does not say which node a device belongs to.
        let node_id = self
            .fs
            .get_pci_device_attribute_contents(&sysfs_name, PciAttribute::NumaNode)
            .and_then(|node| node.trim().parse::<i64>().ok())
            .and_then(|node| NodeId::try_from(node).ok());

        Some(PciDevice {
            address,
            resolved: self.database.resolve(&identity),
            identity,
            revision,
            driver: self.fs.get_pci_device_driver(&sysfs_name),
            node_id,
        })
    }

    /// Describes every PCI device of the host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`][crate::Error::SourceUnavailable] if the PCI device
    /// directory cannot be listed.
    pub fn list_devices(&self) -> crate::Result<PciInfo> {
        let mut devices: Vec<PciDevice> = self
            .fs
            .list_pci_device_addresses()?
            .iter()
            .filter_map(|address| self.describe_device(address))
            .collect();

        devices.sort_by_key(PciDevice::address);

        tracing::debug!(devices = devices.len(), "enumerated PCI devices");

        Ok(PciInfo { devices })
    }
}

/// The PCI devices of the host.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PciInfo {
    devices: Vec<PciDevice>,
}

impl PciInfo {
    /// Takes inventory of the PCI devices of the host described by `options`.
    ///
    /// # Errors
    ///
    /// See [`PciInventory::new()`] and [`PciInventory::list_devices()`].
    pub fn load(options: &Options) -> crate::Result<Self> {
        PciInventory::new(options)?.list_devices()
    }

    /// The devices, ascending by address.
    #[must_use]
    pub fn devices(&self) -> &[PciDevice] {
        &self.devices
    }
}

impl Report for PciInfo {
    const CATEGORY: Category = Category::Pci;
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use mockall::predicate::eq;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::diagnostics::MockDiagnostics;
    use crate::pal::MockFilesystem;
    use crate::{Error, SilentDiagnostics};

    assert_impl_all!(PciInventory: Send, Sync, Debug, Clone);
    assert_impl_all!(PciInfo: Send, Sync, Debug, Clone);
    assert_impl_all!(PciDevice: Send, Sync, Debug, Clone);

    const DATABASE: &str = "\
8086  Intel Corporation
\t1c02  SATA AHCI Controller
\t\t1028 04a9  Latitude E6520
1028  Dell
10de  NVIDIA Corporation
\t2684  AD102 [GeForce RTX 4090]
C 01  Mass storage controller
\t06  SATA controller
\t\t01  AHCI 1.0
C 03  Display controller
\t00  VGA compatible controller
\t\t00  VGA controller
";

    const SATA: &str = "0000:00:1f.2";
    const GPU: &str = "0000:65:00.0";

    fn expect_devices(fs: &mut MockFilesystem) {
        fs.expect_get_pci_device_attribute_contents()
            .returning(|address, attribute| {
                let value = match (address, attribute) {
                    (SATA, PciAttribute::Modalias) => {
                        "pci:v00008086d00001C02sv00001028sd000004A9bc01sc06i01\n"
                    }
                    (SATA, PciAttribute::Revision) => "0x04\n",
                    (SATA, PciAttribute::NumaNode) => "-1\n",
                    (GPU, PciAttribute::Modalias) => {
                        "pci:v000010DEd00002684sv000010DEsd0000167Cbc03sc00i00\n"
                    }
                    (GPU, PciAttribute::NumaNode) => "1\n",
                    _ => return None,
                };

                Some(value.to_string())
            });
        fs.expect_get_pci_device_driver()
            .returning(|address| (address == SATA).then(|| "ahci".to_string()));
    }

    fn inventory(fs: MockFilesystem, diagnostics: impl Diagnostics + 'static) -> PciInventory {
        PciInventory::from_parts(
            FilesystemFacade::from_mock(fs),
            Arc::new(PciDatabase::parse(DATABASE)),
            Arc::new(diagnostics),
        )
    }

    #[test]
    fn describes_known_device() {
        let mut fs = MockFilesystem::new();
        expect_devices(&mut fs);

        let device = inventory(fs, SilentDiagnostics)
            .describe_device("00:1F.2")
            .unwrap();

        assert_eq!(device.address().to_string(), SATA);
        assert_eq!(device.vendor().name(), "Intel Corporation");
        assert_eq!(device.product().name(), "SATA AHCI Controller");
        assert_eq!(device.subsystem().name(), "Latitude E6520");
        assert_eq!(device.class().name(), "Mass storage controller");
        assert_eq!(device.subclass().name(), "SATA controller");
        assert_eq!(device.programming_interface().name(), "AHCI 1.0");
        assert_eq!(device.identity().product(), "1c02");
        assert_eq!(device.revision(), "0x04");
        assert_eq!(device.driver(), Some("ahci"));
        assert_eq!(device.node_id(), None);
    }

    #[test]
    fn missing_attributes_degrade() {
        let mut fs = MockFilesystem::new();
        expect_devices(&mut fs);

        let device = inventory(fs, SilentDiagnostics)
            .describe_device(GPU)
            .unwrap();

        assert_eq!(device.revision(), UNKNOWN);
        assert_eq!(device.driver(), None);
        assert_eq!(device.node_id(), Some(1));
        assert_eq!(device.subsystem().name(), UNKNOWN);
        assert_eq!(device.programming_interface().name(), "VGA controller");
    }

    #[test]
    fn absent_device_is_none() {
        let mut fs = MockFilesystem::new();
        expect_devices(&mut fs);

        assert!(
            inventory(fs, SilentDiagnostics)
                .describe_device("0000:00:00.0")
                .is_none()
        );
    }

    #[test]
    fn malformed_address_warns() {
        let fs = MockFilesystem::new();

        let mut diagnostics = MockDiagnostics::new();
        diagnostics.expect_warn().times(1).return_const(());

        assert!(
            inventory(fs, diagnostics)
                .describe_device("not-an-address")
                .is_none()
        );
    }

    #[test]
    fn undecodable_modalias_warns() {
        let mut fs = MockFilesystem::new();
        fs.expect_get_pci_device_attribute_contents()
            .with(eq(SATA), eq(PciAttribute::Modalias))
            .returning(|_, _| Some("pci:v00008086\n".to_string()));

        let mut diagnostics = MockDiagnostics::new();
        diagnostics
            .expect_warn()
            .withf(|message| message.contains("modalias"))
            .times(1)
            .return_const(());

        assert!(inventory(fs, diagnostics).describe_device(SATA).is_none());
    }

    #[test]
    fn lists_devices_sorted_by_address() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_pci_device_addresses()
            .returning(|| Ok(vec![GPU.to_string(), SATA.to_string()]));
        expect_devices(&mut fs);

        let pci = inventory(fs, SilentDiagnostics).list_devices().unwrap();

        assert_eq!(
            pci.devices()
                .iter()
                .map(|d| d.address().to_string())
                .collect::<Vec<_>>(),
            vec![SATA, GPU]
        );
    }

    #[test]
    fn unlistable_device_directory_is_an_error() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_pci_device_addresses().returning(|| {
            Err(Error::source_unavailable(
                "/sys/bus/pci/devices",
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ))
        });

        let result = inventory(fs, SilentDiagnostics).list_devices();

        assert!(matches!(result, Err(Error::SourceUnavailable { .. })));
    }

    #[test]
    fn database_from_filesystem_propagates_absence() {
        let mut fs = MockFilesystem::new();
        fs.expect_get_pci_ids_contents().returning(|| {
            Err(Error::source_unavailable(
                "/usr/share/hwdata/pci.ids",
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ))
        });

        let result = PciDatabase::from_filesystem(&FilesystemFacade::from_mock(fs));

        assert!(matches!(result, Err(Error::SourceUnavailable { .. })));
    }

    #[test]
    fn json_shape() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_pci_device_addresses()
            .returning(|| Ok(vec![SATA.to_string()]));
        expect_devices(&mut fs);

        let pci = inventory(fs, SilentDiagnostics).list_devices().unwrap();
        let json: serde_json::Value = serde_json::from_str(&pci.to_json().unwrap()).unwrap();

        let device = &json["pci"]["devices"][0];
        assert_eq!(device["address"], SATA);
        assert_eq!(
            device["vendor"],
            serde_json::json!({"id": "8086", "name": "Intel Corporation"})
        );
        assert_eq!(
            device["subsystem"],
            serde_json::json!({"vendor_id": "1028", "id": "04a9", "name": "Latitude E6520"})
        );
        assert_eq!(device["revision"], "0x04");
        assert_eq!(device["driver"], "ahci");
        assert!(device["node_id"].is_null());
    }
}
