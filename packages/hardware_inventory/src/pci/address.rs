use derive_more::derive::Display;
use serde::{Serialize, Serializer};

/// The location of a PCI function on the bus, e.g. `0000:00:1f.2`.
///
/// Displayed in the canonical lower-case `domain:bus:device.function` form used by sysfs.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{domain:04x}:{bus:02x}:{device:02x}.{function:x}")]
pub struct PciAddress {
    domain: u32,
    bus: u8,
    device: u8,
    function: u8,
}

impl PciAddress {
    /// Parses an address in the `domain:bus:device.function` or the short
    /// `bus:device.function` form. Hex digits may be of either case.
    ///
    /// The short form has domain 0.
    ///
    /// # Example
    ///
    /// ```
    /// use hardware_inventory::PciAddress;
    ///
    /// let address = PciAddress::parse("00:1F.2").unwrap();
    /// assert_eq!(address.to_string(), "0000:00:1f.2");
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        let (prefix, slot) = value.rsplit_once('.')?;
        let mut parts = prefix.rsplitn(3, ':');

        let device = parse_hex_field(parts.next()?, 2)?;
        let bus = parse_hex_field(parts.next()?, 2)?;
        let domain = match parts.next() {
            Some(domain)
                if (4..=8).contains(&domain.len())
                    && domain.bytes().all(|b| b.is_ascii_hexdigit()) =>
            {
                u32::from_str_radix(domain, 16).ok()?
            }
            Some(_) => return None,
            None => 0,
        };
        let function = parse_hex_field(slot, 1)?;

        if device > 0x1f || function > 7 {
            return None;
        }

        Some(Self {
            domain,
            bus,
            device,
            function,
        })
    }

    /// The PCI segment (domain) number.
    #[must_use]
    pub const fn domain(&self) -> u32 {
        self.domain
    }

    /// The bus number within the domain.
    #[must_use]
    pub const fn bus(&self) -> u8 {
        self.bus
    }

    /// The device (slot) number on the bus.
    #[must_use]
    pub const fn device(&self) -> u8 {
        self.device
    }

    /// The function number within the device.
    #[must_use]
    pub const fn function(&self) -> u8 {
        self.function
    }
}

fn parse_hex_field(value: &str, width: usize) -> Option<u8> {
    if value.len() != width || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u8::from_str_radix(value, 16).ok()
}

impl Serialize for PciAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_form_round_trips() {
        let address = PciAddress::parse("0000:3b:00.1").unwrap();

        assert_eq!(address.domain(), 0);
        assert_eq!(address.bus(), 0x3b);
        assert_eq!(address.device(), 0);
        assert_eq!(address.function(), 1);
        assert_eq!(address.to_string(), "0000:3b:00.1");
    }

    #[test]
    fn short_form_gets_domain_zero() {
        let address = PciAddress::parse("00:02.0").unwrap();

        assert_eq!(address.to_string(), "0000:00:02.0");
    }

    #[test]
    fn upper_case_is_normalized() {
        let address = PciAddress::parse("0000:AF:1F.7").unwrap();

        assert_eq!(address.to_string(), "0000:af:1f.7");
    }

    #[test]
    fn wide_domain_is_accepted() {
        let address = PciAddress::parse("10000:e1:00.0\n").unwrap();

        assert_eq!(address.domain(), 0x10000);
        assert_eq!(address.to_string(), "10000:e1:00.0");
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for value in [
            "",
            "0000:00:1f",
            "0000:00:1f.8",
            "0000:00:20.0",
            "0000:0:1f.2",
            "00:0000:00:1f.2",
            "000:00:1f.2",
            "0000:zz:1f.2",
            "0000:00:1f.22",
            "+000:00:1f.2",
            "card0",
        ] {
            assert!(PciAddress::parse(value).is_none(), "{value}");
        }
    }

    #[test]
    fn ordering_follows_location() {
        let mut addresses = [
            PciAddress::parse("0000:01:00.0").unwrap(),
            PciAddress::parse("0000:00:1f.3").unwrap(),
            PciAddress::parse("0000:00:1f.0").unwrap(),
            PciAddress::parse("0001:00:00.0").unwrap(),
        ];

        addresses.sort();

        assert_eq!(
            addresses.map(|a| a.to_string()),
            [
                "0000:00:1f.0",
                "0000:00:1f.3",
                "0000:01:00.0",
                "0001:00:00.0"
            ]
        );
    }

    #[test]
    fn serializes_as_string() {
        let address = PciAddress::parse("0000:00:1f.2").unwrap();

        assert_eq!(
            serde_json::to_string(&address).unwrap(),
            r#""0000:00:1f.2""#
        );
    }
}
