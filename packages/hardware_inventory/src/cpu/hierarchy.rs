use foldhash::{HashMap, HashMapExt};
use itertools::Itertools;
use nonempty::NonEmpty;

use crate::cpu::records::ProcessorRecord;
use crate::{Core, CoreId, Diagnostics, Package, PackageId, UNKNOWN};

/// Folds per-logical-processor records into packages of cores of hardware threads.
///
/// Packages are sorted by ID. Cores are listed in discovery order within their package and
/// their logical processors are ascending. Records that cannot be placed are skipped with a
/// warning rather than failing the whole build.
pub(crate) fn build_packages(
    records: &[ProcessorRecord],
    diagnostics: &dyn Diagnostics,
) -> Vec<Package> {
    let mut by_package: HashMap<PackageId, NonEmpty<&ProcessorRecord>> = HashMap::new();

    for record in records {
        let Some(package_id) = record.package_id else {
            diagnostics.warn(&format!(
                "skipping logical processor {}: no parseable physical id",
                record.logical_processor_id()
            ));
            continue;
        };

        by_package
            .entry(package_id)
            .and_modify(|records| records.push(record))
            .or_insert_with(|| NonEmpty::new(record));
    }

    by_package
        .into_iter()
        .sorted_unstable_by_key(|(package_id, _)| *package_id)
        .map(|(package_id, records)| build_package(package_id, &records, diagnostics))
        .collect()
}

fn build_package(
    id: PackageId,
    records: &NonEmpty<&ProcessorRecord>,
    diagnostics: &dyn Diagnostics,
) -> Package {
    // Package-wide attributes are repeated in every record; the first one speaks for all.
    let first = records.head;

    let package = Package {
        id,
        vendor: first.vendor.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        model: first.model.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        capabilities: first
            .flags
            .as_deref()
            .map(|flags| flags.split_whitespace().map(ToString::to_string).collect())
            .unwrap_or_default(),
        reported_cores: first.core_count,
        reported_threads: first.thread_count,
        cores: build_cores(id, records, diagnostics),
    };

    for mismatch in package.total_mismatches() {
        diagnostics.warn(&mismatch);
    }

    package
}

fn build_cores(
    package_id: PackageId,
    records: &NonEmpty<&ProcessorRecord>,
    diagnostics: &dyn Diagnostics,
) -> Vec<Core> {
    let mut cores: Vec<Core> = Vec::new();
    let mut positions: HashMap<CoreId, usize> = HashMap::new();

    for record in records {
        let processor_id = record.logical_processor_id();

        let Some(core_id) = record.core_id else {
            diagnostics.warn(&format!(
                "skipping logical processor {processor_id} of package {package_id}: \
                 no parseable core id"
            ));
            continue;
        };

        if let Some(&position) = positions.get(&core_id) {
            // The position was handed out when the core was pushed, so it is in bounds.
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
