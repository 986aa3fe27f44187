//! We inspect the NUMA topology of the current host and write a human-readable summary of
//! the memory caches of every node to the terminal.
//!
//! Set `HWINV_ROOT` to inspect a copy of another host's `/proc` and `/sys` instead.

use hardware_inventory::{Options, TopologyInfo};

fn main() -> hardware_inventory::Result<()> {
    let topology = TopologyInfo::load(&Options::from_env())?;

    println!("Architecture: {}", topology.architecture());

    for node in topology.nodes() {
        println!("Node {} with {} cores", node.id(), node.cores().len());

        for cache in node.caches() {
            println!(
                "  L{} {} of {} bytes shared by {:?}",
                cache.level(),
                cache.cache_type(),
                cache.size_bytes(),
                cache.logical_processors()
            );
        }
    }

    Ok(())
}
