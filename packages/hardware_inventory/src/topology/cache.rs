use std::cmp::Ordering;

use derive_more::derive::Display;
use foldhash::{HashMap, HashMapExt};
use nonempty::NonEmpty;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::ProcessorId;
use crate::primitive_types::sorted_unique;
use crate::report::ProcessorList;

/// What a memory cache holds.
///
/// The ordering (unified, instruction, data) is the order in which caches of the same level are
/// listed.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// Holds both instructions and data.
    #[display("unified")]
    Unified,

    /// Holds instructions only.
    #[display("instruction")]
    Instruction,

    /// Holds data only.
    #[display("data")]
    Data,
}

impl CacheType {
    /// Parses the contents of a sysfs cache `type` file, e.g. `Unified`.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if value.eq_ignore_ascii_case("unified") {
            Some(Self::Unified)
        } else if value.eq_ignore_ascii_case("instruction") {
            Some(Self::Instruction)
        } else if value.eq_ignore_ascii_case("data") {
            Some(Self::Data)
        } else {
            None
        }
    }
}

/// A memory cache and the logical processors that share it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemoryCache {
    level: u8,
    cache_type: CacheType,
    size_bytes: u64,
    logical_processors: NonEmpty<ProcessorId>,
}

impl MemoryCache {
    /// The cache level, 1 being closest to the core.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// What the cache holds.
    #[must_use]
    pub const fn cache_type(&self) -> CacheType {
        self.cache_type
    }

    /// The capacity of the cache, or 0 if it could not be determined.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// The logical processors that share this cache, ascending and without duplicates.
    #[must_use]
    pub const fn logical_processors(&self) -> &NonEmpty<ProcessorId> {
        &self.logical_processors
    }
}

impl Serialize for MemoryCache {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MemoryCache", 4)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("type", &self.cache_type)?;
        state.serialize_field("size_bytes", &self.size_bytes)?;
        state.serialize_field(
            "logical_processors",
            &ProcessorList(&self.logical_processors),
        )?;
        state.end()
    }
}

/// Identifies one physical cache across the per-processor descriptors that report it.
///
/// The sharer set is kept as the raw text the operating system gave us. Every processor
/// sharing a cache reads the same text for it, so the text is as good an identity as the set.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct CacheKey {
    pub(crate) level: u8,
    pub(crate) cache_type: CacheType,
    pub(crate) shared_processors: String,
}

/// Merges per-processor cache descriptors into one [`MemoryCache`] per distinct cache.
#[derive(Debug, Default)]
pub(crate) struct CacheDeduplicator {
    caches: HashMap<CacheKey, MemoryCache>,
}

impl CacheDeduplicator {
    pub(crate) fn new() -> Self {
        Self {
            caches: HashMap::new(),
        }
    }

    /// Records that `processor_id` reported the cache identified by `key`.
    ///
    /// The size is only determined on the first sighting of a cache.
    pub(crate) fn record(
        &mut self,
        key: CacheKey,
        processor_id: ProcessorId,
        size_bytes: impl FnOnce() -> u64,
    ) {
        self.caches
            .entry(key)
            .and_modify(|cache| cache.logical_processors.push(processor_id))
            .or_insert_with_key(|key| MemoryCache {
                level: key.level,
                cache_type: key.cache_type,
                size_bytes: size_bytes(),
                logical_processors: NonEmpty::new(processor_id),
            });
    }

    /// Returns the distinct caches, ordered by level, then type, then lowest sharer.
    pub(crate) fn finish(self) -> Vec<MemoryCache> {
        let mut caches: Vec<MemoryCache> = self
            .caches
            .into_values()
            .map(|mut cache| {
                cache.logical_processors = sorted_unique(cache.logical_processors);
                cache
            })
            .collect();

        caches.sort_by(compare_caches);

        caches
    }
}

fn compare_caches(a: &MemoryCache, b: &MemoryCache) -> Ordering {
    a.level
        .cmp(&b.level)
        .then(a.cache_type.cmp(&b.cache_type))
        .then_with(|| {
            a.logical_processors
                .iter()
                .cmp(b.logical_processors.iter())
        })
}

/// Parses the contents of a sysfs cache `size` file.
///
/// The kernel writes sizes like `32K` or `1024K`. `M` and `G` suffixes are accepted as binary
/// multiples as well, and a bare number is a byte count.
pub(crate) fn parse_cache_size(value: &str) -> Option<u64> {
    const SUFFIXES: [(char, u64); 3] = [('K', 1024), ('M', 1_048_576), ('G', 1_073_741_824)];

    let value = value.trim();

    let (digits, multiplier) = SUFFIXES
        .iter()
        .find_map(|&(suffix, multiplier)| {
            value
                .strip_suffix([suffix, suffix.to_ascii_lowercase()])
                .map(|digits| (digits, multiplier))
        })
        .unwrap_or((value, 1));

    digits.trim().parse::<u64>().ok()?.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use nonempty::nonempty;

    use super::*;

    fn key(level: u8, cache_type: CacheType, shared: &str) -> CacheKey {
        CacheKey {
            level,
            cache_type,
            shared_processors: shared.to_string(),
        }
    }

    #[test]
    fn same_cache_reported_twice_collapses() {
        let mut deduplicator = CacheDeduplicator::new();

        deduplicator.record(key(2, CacheType::Unified, "0,1"), 0, || 512 * 1024);
        deduplicator.record(key(2, CacheType::Unified, "0,1"), 1, || {
            panic!("size must only be read on first sighting")
        });

        let caches = deduplicator.finish();

        assert_eq!(caches.len(), 1);
        assert_eq!(caches[0].level(), 2);
        assert_eq!(caches[0].cache_type(), CacheType::Unified);
        assert_eq!(caches[0].size_bytes(), 512 * 1024);
        assert_eq!(caches[0].logical_processors(), &nonempty![0, 1]);
    }

    #[test]
    fn sharers_are_ascending_and_unique() {
        let mut deduplicator = CacheDeduplicator::new();

        for processor in [5, 3, 5, 1, 3] {
            deduplicator.record(key(3, CacheType::Unified, "1,3,5"), processor, || 0);
        }

        let caches = deduplicator.finish();

        assert_eq!(caches[0].logical_processors(), &nonempty![1, 3, 5]);
    }

    #[test]
    fn caches_ordered_by_level_type_and_first_sharer() {
        let mut deduplicator = CacheDeduplicator::new();

        deduplicator.record(key(2, CacheType::Unified, "2"), 2, || 0);
        deduplicator.record(key(1, CacheType::Data, "0"), 0, || 0);
        deduplicator.record(key(1, CacheType::Instruction, "0"), 0, || 0);
        deduplicator.record(key(2, CacheType::Unified, "0"), 0, || 0);
        deduplicator.record(key(1, CacheType::Data, "1"), 1, || 0);

        let order: Vec<_> = deduplicator
            .finish()
            .iter()
            .map(|c| (c.level(), c.cache_type(), c.logical_processors().head))
            .collect();

        assert_eq!(
            order,
            vec![
                (1, CacheType::Instruction, 0),
                (1, CacheType::Data, 0),
                (1, CacheType::Data, 1),
                (2, CacheType::Unified, 0),
                (2, CacheType::Unified, 2),
            ]
        );
    }

    #[test]
    fn no_descriptors_no_caches() {
        assert!(CacheDeduplicator::new().finish().is_empty());
    }

    #[test]
    fn cache_type_parse() {
        assert_eq!(CacheType::parse("Unified\n"), Some(CacheType::Unified));
        assert_eq!(CacheType::parse("Instruction"), Some(CacheType::Instruction));
        assert_eq!(CacheType::parse("data"), Some(CacheType::Data));
        assert_eq!(CacheType::parse("Trace"), None);
    }

    #[test]
    fn cache_size_parse() {
        assert_eq!(parse_cache_size("32K\n"), Some(32 * 1024));
        assert_eq!(parse_cache_size("8M"), Some(8 * 1024 * 1024));
        assert_eq!(parse_cache_size("1G"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_cache_size("4096"), Some(4096));
        assert_eq!(parse_cache_size(""), None);
        assert_eq!(parse_cache_size("K"), None);
        assert_eq!(parse_cache_size("lots"), None);
        assert_eq!(parse_cache_size("99999999999999999999G"), None);
    }

    #[test]
    fn serializes_lowercase_type() {
        let mut deduplicator = CacheDeduplicator::new();
        deduplicator.record(key(1, CacheType::Data, "0-1"), 1, || 49152);
        deduplicator.record(key(1, CacheType::Data, "0-1"), 0, || 49152);

        let json = serde_json::to_string(&deduplicator.finish()[0]).unwrap();

        assert_eq!(
            json,
            r#"{"level":1,"type":"data","size_bytes":49152,"logical_processors":[0,1]}"#
        );
    }
}
