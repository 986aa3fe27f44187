use serde::Serialize;

use crate::error::ensure_supported;
use crate::pal::{Filesystem, FilesystemFacade};
use crate::{Category, Diagnostics, NodeId, Options, PciDevice, PciInventory, Report};

/// A graphics card registered with the kernel's direct rendering manager.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GraphicsCard {
    index: u32,
    address: Option<String>,
    device: Option<PciDevice>,
    node_id: Option<NodeId>,
}

impl GraphicsCard {
    /// The N of the `/sys/class/drm/cardN` entry.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// The bus address of the card, if it could be determined.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// The PCI device of the card, if the card is a PCI device that could be described.
    #[must_use]
    pub const fn device(&self) -> Option<&PciDevice> {
        self.device.as_ref()
    }

    /// The NUMA node the card is attached to, if the platform says.
    #[must_use]
    pub const fn node_id(&self) -> Option<NodeId> {
        self.node_id
    }
}

/// The graphics cards of the host.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GpuInfo {
    cards: Vec<GraphicsCard>,
}

impl GpuInfo {
    /// Takes inventory of the graphics cards of the host described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`][crate::Error::UnsupportedPlatform] on platforms
    /// without the Linux virtual filesystem and
    /// [`Error::SourceUnavailable`][crate::Error::SourceUnavailable] if the PCI ID database or
    /// an existing DRM class directory cannot be read. A host without a DRM class directory has
    /// no cards.
    pub fn load(options: &Options) -> crate::Result<Self> {
        ensure_supported(Category::Gpu)?;

        let pci = PciInventory::new(options)?;

        Self::from_filesystem(&options.filesystem(), &pci, options.diagnostics())
    }

    pub(crate) fn from_filesystem(
        fs: &FilesystemFacade,
        pci: &PciInventory,
        diagnostics: &dyn Diagnostics,
    ) -> crate::Result<Self> {
        let Some(card_indexes) = fs.list_drm_card_indexes()? else {
            diagnostics.warn("no DRM class directory, assuming no graphics cards");
            return Ok(Self { cards: Vec::new() });
        };

        let cards = card_indexes
            .into_iter()
            .map(|index| {
                let address = fs.get_drm_card_pci_address(index);

                // Not every card is a PCI device (e.g. virtual or platform display engines).
                let device = address
                    .as_deref()
                    .and_then(|address| pci.describe_device(address));

                GraphicsCard {
                    index,
                    node_id: device.as_ref().and_then(PciDevice::node_id),
                    address,
                    device,
                }
            })
            .collect();

        Ok(Self { cards })
    }

    /// The cards, ascending by index.
    #[must_use]
    pub fn cards(&self) -> &[GraphicsCard] {
        &self.cards
    }
}

impl Report for GpuInfo {
    const CATEGORY: Category = Category::Gpu;
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;
    use std::sync::Arc;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::diagnostics::MockDiagnostics;
    use crate::pal::{MockFilesystem, PciAttribute};
    use crate::{Error, PciDatabase, SilentDiagnostics, UNKNOWN};

    assert_impl_all!(GpuInfo: Send, Sync, Debug, Clone);
    assert_impl_all!(GraphicsCard: Send, Sync, Debug, Clone);

    const GPU: &str = "0000:65:00.0";

    fn load(fs: MockFilesystem) -> crate::Result<GpuInfo> {
        load_with_diagnostics(fs, &SilentDiagnostics)
    }

    fn load_with_diagnostics(
        fs: MockFilesystem,
        diagnostics: &dyn Diagnostics,
    ) -> crate::Result<GpuInfo> {
        let fs = FilesystemFacade::from_mock(fs);

        let pci = PciInventory::from_parts(
            fs.clone(),
            Arc::new(PciDatabase::parse(
                "10de  NVIDIA Corporation\n\t2684  AD102 [GeForce RTX 4090]\n",
            )),
            Arc::new(SilentDiagnostics),
        );

        GpuInfo::from_filesystem(&fs, &pci, diagnostics)
    }

    #[test]
    fn cards_resolve_to_pci_devices() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_drm_card_indexes()
            .returning(|| Ok(Some(vec![0, 1])));
        fs.expect_get_drm_card_pci_address()
            .returning(|index| (index == 0).then(|| GPU.to_string()));
        fs.expect_get_pci_device_attribute_contents()
            .returning(|_, attribute| match attribute {
                PciAttribute::Modalias => Some(
                    "pci:v000010DEd00002684sv000010DEsd0000167Cbc03sc00i00\n".to_string(),
                ),
                PciAttribute::NumaNode => Some("0\n".to_string()),
                PciAttribute::Revision => Some("0xa1\n".to_string()),
            });
        fs.expect_get_pci_device_driver()
            .returning(|_| Some("nvidia".to_string()));

        let gpu = load(fs).unwrap();

        assert_eq!(gpu.cards().len(), 2);

        let first = &gpu.cards()[0];
        assert_eq!(first.index(), 0);
        assert_eq!(first.address(), Some(GPU));
        assert_eq!(first.node_id(), Some(0));

        let device = first.device().unwrap();
        assert_eq!(device.vendor().name(), "NVIDIA Corporation");
        assert_eq!(device.product().name(), "AD102 [GeForce RTX 4090]");
        assert_eq!(device.class().name(), UNKNOWN);
        assert_eq!(device.driver(), Some("nvidia"));

        let second = &gpu.cards()[1];
        assert_eq!(second.index(), 1);
        assert!(second.address().is_none());
        assert!(second.device().is_none());
        assert!(second.node_id().is_none());
    }

    #[test]
    fn no_cards_is_empty() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_drm_card_indexes()
            .returning(|| Ok(Some(Vec::new())));

        let gpu = load(fs).unwrap();

        assert!(gpu.cards().is_empty());
        assert_eq!(gpu.to_json().unwrap(), r#"{"gpu":{"cards":[]}}"#);
    }

    #[test]
    fn missing_drm_directory_is_no_cards() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_drm_card_indexes().returning(|| Ok(None));

        let mut diagnostics = MockDiagnostics::new();
        diagnostics
            .expect_warn()
            .withf(|message| message.contains("no DRM class directory"))
            .times(1)
            .return_const(());

        let gpu = load_with_diagnostics(fs, &diagnostics).unwrap();

        assert!(gpu.cards().is_empty());
    }

    #[test]
    fn unreadable_drm_directory_is_an_error() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_drm_card_indexes().returning(|| {
            Err(Error::source_unavailable(
                "/sys/class/drm",
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ))
        });

        assert!(matches!(load(fs), Err(Error::SourceUnavailable { .. })));
    }
}
