//! We list every PCI device of the current host together with the names the PCI ID database
//! has for it.

use hardware_inventory::{Options, PciInfo};

fn main() -> hardware_inventory::Result<()> {
    let pci = PciInfo::load(&Options::from_env())?;

    for device in pci.devices() {
        println!(
            "{} {}: {} {}",
            device.address(),
            device.class().name(),
            device.vendor().name(),
            device.product().name()
        );
    }

    Ok(())
}
