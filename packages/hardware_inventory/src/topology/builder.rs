use foldhash::{HashMap, HashMapExt};

use crate::pal::{CacheAttribute, Filesystem};
use crate::topology::cache::{CacheDeduplicator, CacheKey, CacheType, MemoryCache, parse_cache_size};
use crate::topology::node::{NodeMemory, TopologyNode};
use crate::{Core, CoreId, Diagnostics, NodeId, ProcessorId};

/// Builds one [`TopologyNode`] per NUMA node, ascending by node ID.
///
/// A kernel without NUMA support has no node directory at all. We then present the whole host
/// as a single node 0.
pub(crate) fn build_nodes(
    fs: &impl Filesystem,
    diagnostics: &dyn Diagnostics,
) -> crate::Result<Vec<TopologyNode>> {
    let node_ids = fs.list_numa_node_ids()?.filter(|ids| !ids.is_empty());

    let Some(node_ids) = node_ids else {
        tracing::debug!("no NUMA nodes exposed; treating the host as a single node");

        let processors = online_processors(fs)?;
        return Ok(vec![build_node(fs, 0, &processors, diagnostics)]);
    };

    node_ids
        .into_iter()
        .map(|node_id| {
            let processors = fs.list_numa_node_processor_ids(node_id)?;

            tracing::debug!(node_id, processors = processors.len(), "discovered NUMA node");

            Ok(build_node(fs, node_id, &processors, diagnostics))
        })
        .collect()
}

/// The processors that are online, preferring the kernel's own list over the directory listing.
fn online_processors(fs: &impl Filesystem) -> crate::Result<Vec<ProcessorId>> {
    let online = fs
        .get_online_processors_contents()
        .and_then(|contents| cpulist::parse(contents.trim()).ok())
        .filter(|processors| !processors.is_empty());

    match online {
        Some(processors) => Ok(processors),
        None => fs.list_processor_ids(),
    }
}

fn build_node(
    fs: &impl Filesystem,
    node_id: NodeId,
    processors: &[ProcessorId],
    diagnostics: &dyn Diagnostics,
) -> TopologyNode {
    TopologyNode {
        id: node_id,
        cores: build_node_cores(fs, processors, diagnostics),
        caches: build_node_caches(fs, processors, diagnostics),
        distances: read_distances(fs, node_id, diagnostics),
        memory: read_memory(fs, node_id, diagnostics),
    }
}

fn build_node_cores(
    fs: &impl Filesystem,
    processors: &[ProcessorId],
    diagnostics: &dyn Diagnostics,
) -> Vec<Core> {
    let mut cores: Vec<Core> = Vec::new();
    let mut positions: HashMap<CoreId, usize> = HashMap::new();

    for &processor_id in processors {
        let core_id = fs
            .get_core_id_contents(processor_id)
            .and_then(|contents| contents.trim().parse::<CoreId>().ok());

        let Some(core_id) = core_id else {
            diagnostics.warn(&format!(
                "core ID of logical processor {processor_id} could not be read; \
                 it is not assigned to any core"
            ));
            continue;
        };

        if let Some(&position) = positions.get(&core_id) {
            if let Some(core) = cores.get_mut(position) {
                core.add_logical_processor(processor_id);
            }
        } else {
            positions.insert(core_id, cores.len());
            cores.push(Core::new(core_id, cores.len(), processor_id));
        }
    }

    for core in &mut cores {
        core.sort_logical_processors();
    }

    cores
}

fn build_node_caches(
    fs: &impl Filesystem,
    processors: &[ProcessorId],
    diagnostics: &dyn Diagnostics,
) -> Vec<MemoryCache> {
    let mut deduplicator = CacheDeduplicator::new();

    for &processor_id in processors {
        for cache_index in fs.list_cache_indexes(processor_id) {
            let Some(key) = read_cache_key(fs, processor_id, cache_index, diagnostics) else {
                continue;
            };

            deduplicator.record(key, processor_id, || {
                read_cache_size(fs, processor_id, cache_index, diagnostics)
            });
        }
    }

    deduplicator.finish()
}

fn read_cache_key(
    fs: &impl Filesystem,
    processor_id: ProcessorId,
    cache_index: u32,
    diagnostics: &dyn Diagnostics,
) -> Option<CacheKey> {
    let read = |attribute| fs.get_cache_attribute_contents(processor_id, cache_index, attribute);

    let level = read(CacheAttribute::Level).and_then(|level| level.trim().parse::<u8>().ok());
    let Some(level) = level else {
        diagnostics.warn(&format!(
            "cache index{cache_index} of logical processor {processor_id} has no valid level; \
             skipping it"
        ));
        return None;
    };

    let cache_type = read(CacheAttribute::Type).and_then(|value| CacheType::parse(&value));
    let Some(cache_type) = cache_type else {
        diagnostics.warn(&format!(
            "cache index{cache_index} of logical processor {processor_id} has no recognized \
             type; skipping it"
        ));
        return None;
    };

    // A cache nobody says is shared is private to the processor reporting it.
    let shared_processors = [CacheAttribute::SharedCpuList, CacheAttribute::SharedCpuMap]
        .into_iter()
        .filter_map(read)
        .map(|contents| contents.trim().to_string())
        .find(|contents| !contents.is_empty())
        .unwrap_or_else(|| processor_id.to_string());

    Some(CacheKey {
        level,
        cache_type,
        shared_processors,
    })
}

fn read_cache_size(
    fs: &impl Filesystem,
    processor_id: ProcessorId,
    cache_index: u32,
    diagnostics: &dyn Diagnostics,
) -> u64 {
    let size = fs
        .get_cache_attribute_contents(processor_id, cache_index, CacheAttribute::Size)
        .and_then(|contents| parse_cache_size(&contents));

    size.unwrap_or_else(|| {
        diagnostics.warn(&format!(
            "size of cache index{cache_index} of logical processor {processor_id} could not be \
             determined; reporting 0"
        ));
        0
    })
}

fn read_distances(
    fs: &impl Filesystem,
    node_id: NodeId,
    diagnostics: &dyn Diagnostics,
) -> Vec<u32> {
    let Some(contents) = fs.get_numa_node_distance_contents(node_id) else {
        return Vec::new();
    };

    let distances: Result<Vec<u32>, _> = contents.split_whitespace().map(str::parse).collect();

    distances.unwrap_or_else(|_| {
        diagnostics.warn(&format!(
            "distances of NUMA node {node_id} could not be parsed: {}",
            contents.trim()
        ));
        Vec::new()
    })
}

fn read_memory(
    fs: &impl Filesystem,
    node_id: NodeId,
    diagnostics: &dyn Diagnostics,
) -> Option<NodeMemory> {
    let contents = fs.get_numa_node_meminfo_contents(node_id)?;

    let total = parse_mem_total(&contents);

    if total.is_none() {
        diagnostics.warn(&format!(
            "total memory of NUMA node {node_id} could not be determined"
        ));
    }

    total.map(NodeMemory::new)
}

/// Finds the `MemTotal` line of a node meminfo file and returns its value in bytes.
///
/// Example line: `Node 0 MemTotal:       32500732 kB`
fn parse_mem_total(meminfo: &str) -> Option<u64> {
    let (_, value) = meminfo
        .lines()
        .find_map(|line| line.split_once("MemTotal:"))?;

    let mut parts = value.split_whitespace();
    let amount = parts.next()?.parse::<u64>().ok()?;

    match parts.next() {
        Some(unit) if unit.eq_ignore_ascii_case("kb") => amount.checked_mul(1024),
        None => Some(amount),
        Some(_) => None,
    }
}
