//! Joins `/proc/cpuinfo` blocks with `/proc/stat` lines and sysfs readings.
//!
//! `correlate` is a pure function: everything it needs is read beforehand
//! into a `CpuInfoTable`, a `StatTable` and a `SideData`.

use std::collections::{BTreeMap, BTreeSet};

use crate::collector::procfs::{CpuInfoBlock, CpuInfoTable, StatTable};
use crate::models::{CacheLevel, LogicalProcessor, PhysicalPackage, Topology};

/// Sysfs readings for one processor, already formatted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorSide {
    pub frequency_min: String,
    pub frequency_max: String,
    /// `scaling_cur_freq`; only used when cpuinfo lacks `cpu MHz`.
    pub frequency_current: String,
    pub caches: Vec<CacheLevel>,
    /// `topology/physical_package_id`; only used when cpuinfo lacks `physical id`.
    pub package_id: Option<i32>,
    /// `topology/core_id`; only used when cpuinfo lacks `core id`.
    pub core_id: Option<i32>,
}

/// Readings that do not come from `/proc/cpuinfo` or `/proc/stat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideData {
    pub processors: BTreeMap<u32, ProcessorSide>,
    pub architecture: String,
    pub temperature: String,
}

fn text(block: &CpuInfoBlock, key: &str) -> String {
    block.get(key).cloned().unwrap_or_default()
}

fn int(block: &CpuInfoBlock, key: &str) -> i32 {
    block.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Integer from cpuinfo when the key is present, otherwise the sysfs value.
fn int_or(block: &CpuInfoBlock, key: &str, fallback: Option<i32>) -> i32 {
    if block.contains_key(key) {
        int(block, key)
    } else {
        fallback.unwrap_or(0)
    }
}

/// Builds the processor and package collections.
///
/// Processors are visited in ascending numeric index. A package record is
/// started the first time a `physical id` is seen, so each id yields exactly
/// one package even if its processors are not listed contiguously. Package
/// counters come from the aggregate `/proc/stat` line and `thread_count` is
/// the host-wide processor count, for every package.
pub fn correlate(cpuinfo: &CpuInfoTable, stat: &StatTable, side: &SideData) -> Topology {
    let thread_count = i32::try_from(cpuinfo.len()).unwrap_or(i32::MAX);
    let mut topology = Topology::default();
    let mut seen_packages = BTreeSet::new();

    for block in cpuinfo.sorted_by_index() {
        let processor_index: u32 = block
            .get("processor")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let sysfs = side
            .processors
            .get(&processor_index)
            .cloned()
            .unwrap_or_default();

        let frequency_current = match block.get("cpu MHz") {
            Some(mhz) if !mhz.is_empty() => mhz.clone(),
            _ => sysfs.frequency_current,
        };

        let mut processor = LogicalProcessor {
            processor_index,
            package_id: int_or(block, "physical id", sysfs.package_id),
            core_id: int_or(block, "core id", sysfs.core_id),
            cache_size_all: text(block, "cache size"),
            caches: sysfs.caches,
            flags: text(block, "flags"),
            stepping: text(block, "stepping"),
            family: text(block, "cpu family"),
            bogo_mips: text(block, "bogomips"),
            frequency_current,
            frequency_min: sysfs.frequency_min,
            frequency_max: sysfs.frequency_max,
            ..Default::default()
        };
        if let Some(line) = stat.processor(processor_index) {
            processor.times = line.times;
            processor.usage = line.usage;
        }

        if seen_packages.insert(processor.package_id) {
            let mut package = PhysicalPackage {
                package_id: processor.package_id,
                vendor: text(block, "vendor_id"),
                model: text(block, "model name"),
                architecture: side.architecture.clone(),
                core_count: int(block, "cpu cores"),
                thread_count,
                temperature: side.temperature.clone(),
                ..Default::default()
            };
            if let Some(aggregate) = stat.aggregate() {
                package.times = aggregate.times;
                package.usage = aggregate.usage;
            }
            topology.packages.push(package);
        }

        topology.processors.push(processor);
    }

    topology
}
