use foldhash::HashMap;
use itertools::Itertools;

use crate::{CoreId, PackageId, ProcessorId};

/// The attributes of one block of a "key: value" file, such as one logical processor
/// in /proc/cpuinfo.
pub(crate) type FlatRecord = HashMap<String, String>;

/// Splits a "key: value" text stream into blocks delimited by empty lines.
///
/// The result is in discovery order. Within a block, a repeated key keeps the last value seen.
/// Values are trimmed but otherwise not interpreted. Lines without a `:` separator are ignored
/// and blocks that yield no attributes at all are dropped.
pub(crate) fn parse_flat_records(text: &str) -> Vec<FlatRecord> {
    text.lines()
        .map(str::trim)
        .chunk_by(|line| line.is_empty())
        .into_iter()
        .filter_map(|(is_empty, lines)| {
            if is_empty {
                return None;
            }

            // Example content:
            // processor       : 29
            // vendor_id       : GenuineIntel
            // physical id     : 1
            // core id         : 5
            let record: FlatRecord = lines
                .filter_map(|line| line.split_once(':'))
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                .collect();

            if record.is_empty() {
                return None;
            }

            Some(record)
        })
        .collect_vec()
}

/// The fields of one /proc/cpuinfo block that the processor hierarchy is built from.
///
/// Every numeric field is optional; an absent or unparsable value is `None` and the
/// hierarchy builder decides how to degrade.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ProcessorRecord {
    /// Position of the block in the stream.
    pub(crate) position: usize,

    pub(crate) processor_id: Option<ProcessorId>,
    pub(crate) package_id: Option<PackageId>,
    pub(crate) core_id: Option<CoreId>,

    /// Number of cores in the package, as reported ("cpu cores").
    pub(crate) core_count: Option<u32>,

    /// Number of hardware threads in the package, as reported ("siblings").
    pub(crate) thread_count: Option<u32>,

    pub(crate) vendor: Option<String>,
    pub(crate) model: Option<String>,

    /// Space-separated feature tokens.
    pub(crate) flags: Option<String>,
}

impl ProcessorRecord {
    pub(crate) fn from_flat(position: usize, record: &FlatRecord) -> Self {
        let mut result = Self {
            position,
            ..Self::default()
        };

        for (key, value) in record {
            match key.as_str() {
                "processor" => result.processor_id = value.parse().ok(),
                "physical id" => result.package_id = value.parse().ok(),
                "core id" => result.core_id = value.parse().ok(),
                "cpu cores" => result.core_count = value.parse().ok(),
                "siblings" => result.thread_count = value.parse().ok(),
                "vendor_id" => result.vendor = Some(value.clone()),
                "model name" => result.model = Some(value.clone()),
                // ARM kernels call the feature list "Features".
                "flags" | "Features" => result.flags = Some(value.clone()),
                _ => {}
            }
        }

        result
    }

    /// The logical processor this block describes.
    ///
    /// If the block does not say, we assume the kernel listed processors in order.
    pub(crate) fn logical_processor_id(&self) -> ProcessorId {
        self.processor_id
            .unwrap_or_else(|| ProcessorId::try_from(self.position).unwrap_or(ProcessorId::MAX))
    }
}

/// Parses a /proc/cpuinfo style stream into one typed record per logical processor.
pub(crate) fn parse_processor_records(text: &str) -> Vec<ProcessorRecord> {
    parse_flat_records(text)
        .iter()
        .enumerate()
        .map(|(position, record)| ProcessorRecord::from_flat(position, record))
        .collect()
}
