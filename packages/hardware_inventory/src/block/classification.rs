use derive_more::derive::Display;
use serde::Serialize;

/// The kind of medium behind a block device.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveType {
    /// A rotating hard disk.
    #[display("hdd")]
    Hdd,

    /// A solid-state drive.
    #[display("ssd")]
    Ssd,

    /// A floppy disk drive.
    #[display("fdd")]
    Fdd,

    /// An optical disc drive.
    #[display("odd")]
    Odd,

    /// A device backed by something other than a physical medium, e.g. a loop device.
    #[display("virtual")]
    Virtual,

    /// The name does not tell.
    #[display("unknown")]
    Unknown,
}

/// The kind of controller, as far as it can be told from the kernel's name for the device.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageController {
    /// Parallel ATA driven by the legacy IDE drivers.
    #[display("ide")]
    Ide,

    /// SCSI, including SATA and USB mass storage that the kernel drives through its SCSI layer.
    #[display("scsi")]
    Scsi,

    /// NVM Express.
    #[display("nvme")]
    Nvme,

    /// A paravirtualized virtio block device.
    #[display("virtio")]
    Virtio,

    /// SD and eMMC cards.
    #[display("mmc")]
    Mmc,

    /// A loop device backed by a file.
    #[display("loop")]
    Loop,

    /// The name does not tell.
    #[display("unknown")]
    Unknown,
}

/// The bus a block device hangs off, derived from its position in the sysfs device tree.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    /// Parallel ATA.
    #[display("ide")]
    Ide,

    /// ATA, including SATA.
    #[display("ata")]
    Ata,

    /// SCSI, or anything else attached through a SCSI host adapter.
    #[display("scsi")]
    Scsi,

    /// NVM Express over PCI Express.
    #[display("nvme")]
    Nvme,

    /// The virtio paravirtualized bus.
    #[display("virtio")]
    Virtio,

    /// USB mass storage.
    #[display("usb")]
    Usb,

    /// The MMC bus of SD and eMMC cards.
    #[display("mmc")]
    Mmc,

    /// Not attached to any bus, e.g. loop and device-mapper devices.
    #[display("virtual")]
    Virtual,

    /// The device path does not tell.
    #[display("unknown")]
    Unknown,
}

impl BusType {
    /// Derives the bus from the target of the `/sys/block/{}` symlink, e.g.
    /// `../devices/pci0000:00/0000:00:17.0/ata1/host0/target0:0:0/0:0:0:0/block/sda`.
    ///
    /// Rules are tried in order and a rule matches if any path component starts with its
    /// prefix, so a USB stick is reported as USB even though its path also has a SCSI host.
    pub(crate) fn from_device_link(link: &str) -> Self {
        const RULES: [(&str, BusType); 8] = [
            ("usb", BusType::Usb),
            ("ata", BusType::Ata),
            ("ide", BusType::Ide),
            ("nvme", BusType::Nvme),
            ("virtio", BusType::Virtio),
            ("mmc", BusType::Mmc),
            ("virtual", BusType::Virtual),
            ("host", BusType::Scsi),
        ];

        RULES
            .iter()
            .find(|(prefix, _)| {
                link.split('/')
                    .any(|component| component.starts_with(prefix))
            })
            .map_or(Self::Unknown, |&(_, bus)| bus)
    }
}

/// Classifies a block device by the name the kernel gave it.
///
/// Disks named like SCSI, IDE or virtio devices are assumed to rotate unless the kernel says
/// otherwise via `queue/rotational`.
pub(crate) fn classify(name: &str, rotational: Option<bool>) -> (DriveType, StorageController) {
    const PREFIXES: [(&str, DriveType, StorageController); 9] = [
        ("fd", DriveType::Fdd, StorageController::Unknown),
        ("sr", DriveType::Odd, StorageController::Scsi),
        ("sd", DriveType::Hdd, StorageController::Scsi),
        ("hd", DriveType::Hdd, StorageController::Ide),
        ("vd", DriveType::Hdd, StorageController::Virtio),
        ("xvd", DriveType::Hdd, StorageController::Scsi),
        ("nvme", DriveType::Ssd, StorageController::Nvme),
        ("mmcblk", DriveType::Ssd, StorageController::Mmc),
        ("loop", DriveType::Virtual, StorageController::Loop),
    ];

    let (drive_type, controller) = PREFIXES
        .iter()
        .find(|(prefix, _, _)| name.starts_with(prefix))
        .map_or(
            (DriveType::Unknown, StorageController::Unknown),
            |&(_, drive_type, controller)| (drive_type, controller),
        );

    match (drive_type, rotational) {
        (DriveType::Hdd, Some(false)) => (DriveType::Ssd, controller),
        _ => (drive_type, controller),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_name() {
        assert_eq!(
            classify("sda", None),
            (DriveType::Hdd, StorageController::Scsi)
        );
        assert_eq!(
            classify("sr0", None),
            (DriveType::Odd, StorageController::Scsi)
        );
        assert_eq!(
            classify("hdc", None),
            (DriveType::Hdd, StorageController::Ide)
        );
        assert_eq!(
            classify("vdb", None),
            (DriveType::Hdd, StorageController::Virtio)
        );
        assert_eq!(
            classify("nvme0n1", None),
            (DriveType::Ssd, StorageController::Nvme)
        );
        assert_eq!(
            classify("mmcblk0", None),
            (DriveType::Ssd, StorageController::Mmc)
        );
        assert_eq!(
            classify("loop3", None),
            (DriveType::Virtual, StorageController::Loop)
        );
        assert_eq!(
            classify("fd0", None),
            (DriveType::Fdd, StorageController::Unknown)
        );
        assert_eq!(
            classify("dm-0", None),
            (DriveType::Unknown, StorageController::Unknown)
        );
    }

    #[test]
    fn non_rotational_disk_is_ssd() {
        assert_eq!(
            classify("sda", Some(false)),
            (DriveType::Ssd, StorageController::Scsi)
        );
        assert_eq!(
            classify("sda", Some(true)),
            (DriveType::Hdd, StorageController::Scsi)
        );

        // Only disks are reclassified.
        assert_eq!(
            classify("sr0", Some(false)),
            (DriveType::Odd, StorageController::Scsi)
        );
    }

    #[test]
    fn bus_from_device_link() {
        assert_eq!(
            BusType::from_device_link(
                "../devices/pci0000:00/0000:00:17.0/ata1/host0/target0:0:0/0:0:0:0/block/sda"
            ),
            BusType::Ata
        );
        assert_eq!(
            BusType::from_device_link(
                "../devices/pci0000:00/0000:00:14.0/usb2/2-1/2-1:1.0/host6/target6:0:0/6:0:0:0/block/sdb"
            ),
            BusType::Usb
        );
        assert_eq!(
            BusType::from_device_link(
                "../devices/pci0000:00/0000:00:1d.0/0000:3d:00.0/nvme/nvme0/nvme0n1"
            ),
            BusType::Nvme
        );
        assert_eq!(
            BusType::from_device_link("../devices/pci0000:00/0000:00:04.0/virtio1/block/vda"),
            BusType::Virtio
        );
        assert_eq!(
            BusType::from_device_link(
                "../devices/platform/soc/mmc_host/mmc0/mmc0:0001/block/mmcblk0"
            ),
            BusType::Mmc
        );
        assert_eq!(
            BusType::from_device_link("../devices/virtual/block/loop0"),
            BusType::Virtual
        );
        assert_eq!(
            BusType::from_device_link(
                "../devices/pci0000:00/0000:00:10.0/host2/target2:0:0/2:0:0:0/block/sdc"
            ),
            BusType::Scsi
        );
        assert_eq!(
            BusType::from_device_link("../devices/vbd-51712/block/xvda"),
            BusType::Unknown
        );
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(DriveType::Ssd.to_string(), "ssd");
        assert_eq!(StorageController::Nvme.to_string(), "nvme");
        assert_eq!(BusType::Virtual.to_string(), "virtual");
    }
}
