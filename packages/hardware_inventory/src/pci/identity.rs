/// The seven hexadecimal codes that identify what a PCI device is.
///
/// Decoded from the kernel's `modalias` string for the device, e.g.
/// `pci:v00008086d00001C02sv00001028sd000004A9bc01sc06i01`. All codes are lower-case.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DeviceIdentity {
    vendor: String,
    product: String,
    subsystem_vendor: String,
    subsystem_product: String,
    class: String,
    subclass: String,
    programming_interface: String,
}

/// Total length of a PCI modalias string.
const MODALIAS_LEN: usize = 53;

/// Literal markers of a PCI modalias string, with their byte offsets.
const MARKERS: [(usize, &str); 7] = [
    (0, "pci:v"),
    (13, "d"),
    (22, "sv"),
    (32, "sd"),
    (42, "bc"),
    (46, "sc"),
    (50, "i"),
];

/// Byte ranges of the hex fields, including the zero-padded high halves of the 32-bit IDs.
const HEX_FIELDS: [(usize, usize); 7] = [
    (5, 13),
    (14, 22),
    (24, 32),
    (34, 42),
    (44, 46),
    (48, 50),
    (51, 53),
];

impl DeviceIdentity {
    /// Decodes a PCI modalias string.
    ///
    /// Returns `None` unless the whole string has the exact modalias layout: correct length,
    /// all field markers in place and every field hexadecimal. Surrounding whitespace is
    /// ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use hardware_inventory::DeviceIdentity;
    ///
    /// let identity =
    ///     DeviceIdentity::decode("pci:v00008086d00001C02sv00001028sd000004A9bc01sc06i01")
    ///         .unwrap();
    ///
    /// assert_eq!(identity.vendor(), "8086");
    /// assert_eq!(identity.product(), "1c02");
    /// assert_eq!(identity.subsystem_product(), "04a9");
    /// assert_eq!(identity.class(), "01");
    /// ```
    #[must_use]
    pub fn decode(modalias: &str) -> Option<Self> {
        let modalias = modalias.trim();

        if modalias.len() != MODALIAS_LEN || !modalias.is_ascii() {
            return None;
        }

        let markers_present = MARKERS.iter().all(|&(offset, marker)| {
            modalias
                .get(offset..)
                .is_some_and(|rest| rest.starts_with(marker))
        });

        let fields_hex = HEX_FIELDS.iter().all(|&(start, end)| {
            modalias
                .get(start..end)
                .is_some_and(|field| field.bytes().all(|b| b.is_ascii_hexdigit()))
        });

        if !markers_present || !fields_hex {
            return None;
        }

        let field = |start: usize, end: usize| -> Option<String> {
            modalias.get(start..end).map(str::to_ascii_lowercase)
        };

        Some(Self {
            vendor: field(9, 13)?,
            product: field(18, 22)?,
            subsystem_vendor: field(28, 32)?,
            subsystem_product: field(38, 42)?,
            class: field(44, 46)?,
            subclass: field(48, 50)?,
            programming_interface: field(51, 53)?,
        })
    }

    /// The vendor ID, e.g. `8086`.
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// The product (device) ID within the vendor.
    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    /// The vendor ID of the subsystem, i.e. of the board the chip is built into.
    #[must_use]
    pub fn subsystem_vendor(&self) -> &str {
        &self.subsystem_vendor
    }

    /// The product ID of the subsystem.
    #[must_use]
    pub fn subsystem_product(&self) -> &str {
        &self.subsystem_product
    }

    /// The base class code, e.g. `03` for display controllers.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The subclass code within the class.
    #[must_use]
    pub fn subclass(&self) -> &str {
        &self.subclass
    }

    /// The programming interface code within the subclass.
    #[must_use]
    pub fn programming_interface(&self) -> &str {
        &self.programming_interface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SATA_CONTROLLER: &str = "pci:v00008086d00001C02sv00001028sd000004A9bc01sc06i01";

    #[test]
    fn decodes_every_field() {
        let identity = DeviceIdentity::decode(SATA_CONTROLLER).unwrap();

        assert_eq!(identity.vendor(), "8086");
        assert_eq!(identity.product(), "1c02");
        assert_eq!(identity.subsystem_vendor(), "1028");
        assert_eq!(identity.subsystem_product(), "04a9");
        assert_eq!(identity.class(), "01");
        assert_eq!(identity.subclass(), "06");
        assert_eq!(identity.programming_interface(), "01");
    }

    #[test]
    fn trailing_newline_is_ignored() {
        let with_newline = format!("{SATA_CONTROLLER}\n");

        assert_eq!(
            DeviceIdentity::decode(&with_newline),
            DeviceIdentity::decode(SATA_CONTROLLER)
        );
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(DeviceIdentity::decode("").is_none());
        assert!(DeviceIdentity::decode("pci:v00008086d00001C02").is_none());
        assert!(DeviceIdentity::decode(&format!("{SATA_CONTROLLER}0")).is_none());
    }

    #[test]
    fn other_buses_are_rejected() {
        // Same length as a PCI modalias but a different bus prefix.
        assert!(
            DeviceIdentity::decode("usb:v00008086d00001C02sv00001028sd000004A9bc01sc06i01")
                .is_none()
        );
    }

    #[test]
    fn displaced_markers_are_rejected() {
        assert!(
            DeviceIdentity::decode("pci:v00008086x00001C02sv00001028sd000004A9bc01sc06i01")
                .is_none()
        );
        assert!(
            DeviceIdentity::decode("pci:v00008086d00001C02sv00001028sd000004A9bc01sc06x01")
                .is_none()
        );
    }

    #[test]
    fn non_hex_fields_are_rejected() {
        assert!(
            DeviceIdentity::decode("pci:v0000808Gd00001C02sv00001028sd000004A9bc01sc06i01")
                .is_none()
        );
        assert!(
            DeviceIdentity::decode("pci:v00008086d00001C02sv00001028sd000004A9bc01sc06i0z")
                .is_none()
        );
    }

    #[test]
    fn non_ascii_is_rejected() {
        // 53 bytes, but with a multi-byte character in place of two ASCII ones.
        assert!(
            DeviceIdentity::decode("pci:v00008086d00001C02sv00001028sd000004A9bc01sc06ié")
                .is_none()
        );
    }
}
