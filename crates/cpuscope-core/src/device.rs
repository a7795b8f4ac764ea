//! Read-only query surface over one CPU snapshot.
//!
//! Every accessor takes an index and returns the field or a sentinel:
//! `-1` for numbers, `""` for text, a zeroed record for counters. Negative
//! indices get the same sentinel as indices past the end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collector::{CpuCollector, Diagnostic, FileSystem, RealFs, SourcePaths};
use crate::models::{CpuTimes, CpuUsage, LogicalProcessor, PhysicalPackage, Topology};

/// Which cache `CpuDevice::cache` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheKind {
    /// The `cache size` line of `/proc/cpuinfo`.
    #[default]
    All,
    L1Data,
    L1Instruction,
    L2,
    L3,
}

impl CacheKind {
    fn matches(self, level: u8, kind: &str) -> bool {
        match self {
            Self::All => false,
            Self::L1Data => level == 1 && kind == "Data",
            Self::L1Instruction => level == 1 && kind == "Instruction",
            Self::L2 => level == 2,
            Self::L3 => level == 3,
        }
    }
}

/// Frozen per-processor and per-package CPU inventory.
///
/// Built once by [`CpuCollector`]; nothing re-reads the sources afterwards.
/// To observe new counters, collect a new device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuDevice {
    collected_at: DateTime<Utc>,
    #[serde(flatten)]
    topology: Topology,
    diagnostics: Vec<Diagnostic>,
}

impl CpuDevice {
    /// Snapshot of the running host using the default source paths.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::collect(RealFs::new(), &SourcePaths::default())
    }

    /// Snapshot read through `fs` from `paths`.
    pub fn collect<F: FileSystem>(fs: F, paths: &SourcePaths) -> Self {
        CpuCollector::new(fs, paths.clone()).collect()
    }

    pub fn from_parts(
        topology: Topology,
        diagnostics: Vec<Diagnostic>,
        collected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            collected_at,
            topology,
            diagnostics,
        }
    }

    fn package(&self, physical_id: i32) -> Option<&PhysicalPackage> {
        usize::try_from(physical_id)
            .ok()
            .and_then(|i| self.topology.packages.get(i))
    }

    fn processor(&self, processor_id: i32) -> Option<&LogicalProcessor> {
        usize::try_from(processor_id)
            .ok()
            .and_then(|i| self.topology.processors.get(i))
    }

    fn package_text(&self, physical_id: i32, field: fn(&PhysicalPackage) -> &str) -> &str {
        self.package(physical_id).map(field).unwrap_or("")
    }

    fn processor_text(&self, processor_id: i32, field: fn(&LogicalProcessor) -> &str) -> &str {
        self.processor(processor_id).map(field).unwrap_or("")
    }

    pub fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    pub fn processors(&self) -> &[LogicalProcessor] {
        &self.topology.processors
    }

    pub fn packages(&self) -> &[PhysicalPackage] {
        &self.topology.packages
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Why fields came back empty, in the order sources were read.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ---------------------------------------------------------------------
    // Package-indexed
    // ---------------------------------------------------------------------

    /// Number of physical packages (sockets).
    pub fn physical_count(&self) -> i32 {
        i32::try_from(self.topology.packages.len()).unwrap_or(i32::MAX)
    }

    pub fn core_count(&self, physical_id: i32) -> i32 {
        self.package(physical_id).map_or(-1, |p| p.core_count)
    }

    /// Logical processors on the whole host; identical for every package.
    pub fn thread_count(&self, physical_id: i32) -> i32 {
        self.package(physical_id).map_or(-1, |p| p.thread_count)
    }

    pub fn vendor(&self, physical_id: i32) -> &str {
        self.package_text(physical_id, |p| p.vendor.as_str())
    }

    pub fn model(&self, physical_id: i32) -> &str {
        self.package_text(physical_id, |p| p.model.as_str())
    }

    pub fn architecture(&self, physical_id: i32) -> &str {
        self.package_text(physical_id, |p| p.architecture.as_str())
    }

    pub fn temperature(&self, physical_id: i32) -> &str {
        self.package_text(physical_id, |p| p.temperature.as_str())
    }

    /// Whole-machine counters (the aggregate `cpu` line of `/proc/stat`).
    ///
    /// Every package carries the same aggregate, so this is not per-socket
    /// even on multi-socket hosts. Zero when no package was found.
    pub fn stat(&self) -> CpuTimes {
        self.package(0).map(|p| p.times).unwrap_or_default()
    }

    /// Usage derived from [`CpuDevice::stat`].
    pub fn usage(&self) -> CpuUsage {
        self.package(0).map(|p| p.usage).unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // Processor-indexed
    // ---------------------------------------------------------------------

    /// Number of logical processors.
    pub fn processor_count(&self) -> i32 {
        i32::try_from(self.topology.processors.len()).unwrap_or(i32::MAX)
    }

    pub fn physical_id(&self, processor_id: i32) -> i32 {
        self.processor(processor_id).map_or(-1, |c| c.package_id)
    }

    pub fn core_id(&self, processor_id: i32) -> i32 {
        self.processor(processor_id).map_or(-1, |c| c.core_id)
    }

    pub fn min_freq(&self, processor_id: i32) -> &str {
        self.processor_text(processor_id, |c| c.frequency_min.as_str())
    }

    pub fn max_freq(&self, processor_id: i32) -> &str {
        self.processor_text(processor_id, |c| c.frequency_max.as_str())
    }

    pub fn current_freq(&self, processor_id: i32) -> &str {
        self.processor_text(processor_id, |c| c.frequency_current.as_str())
    }

    /// Cache size for `processor_id`.
    ///
    /// `CacheKind::All` is the `/proc/cpuinfo` figure (e.g. "8192 KB"); the
    /// per-level kinds come from sysfs (e.g. "32K") and are empty when that
    /// level is not described.
    pub fn cache(&self, processor_id: i32, kind: CacheKind) -> &str {
        let Some(cpu) = self.processor(processor_id) else {
            return "";
        };
        if kind == CacheKind::All {
            return &cpu.cache_size_all;
        }
        cpu.caches
            .iter()
            .find(|c| kind.matches(c.level, &c.kind))
            .map_or("", |c| c.size.as_str())
    }

    pub fn flags(&self, processor_id: i32) -> &str {
        self.processor_text(processor_id, |c| c.flags.as_str())
    }

    pub fn stepping(&self, processor_id: i32) -> &str {
        self.processor_text(processor_id, |c| c.stepping.as_str())
    }

    pub fn family(&self, processor_id: i32) -> &str {
        self.processor_text(processor_id, |c| c.family.as_str())
    }

    pub fn bogo_mips(&self, processor_id: i32) -> &str {
        self.processor_text(processor_id, |c| c.bogo_mips.as_str())
    }

    pub fn processor_stat(&self, processor_id: i32) -> CpuTimes {
        self.processor(processor_id)
            .map(|c| c.times)
            .unwrap_or_default()
    }

    pub fn processor_usage(&self, processor_id: i32) -> CpuUsage {
        self.processor(processor_id)
            .map(|c| c.usage)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CacheLevel;

    fn device() -> CpuDevice {
        let times = CpuTimes {
            user: 10,
            idle: 90,
            ..Default::default()
        };
        let topology = Topology {
            processors: vec![LogicalProcessor {
                processor_index: 0,
                core_id: 3,
                cache_size_all: "512 KB".to_string(),
                caches: vec![
                    CacheLevel {
                        level: 1,
                        kind: "Data".to_string(),
                        size: "48K".to_string(),
                        ..Default::default()
                    },
                    CacheLevel {
                        level: 1,
                        kind: "Instruction".to_string(),
                        size: "32K".to_string(),
                        ..Default::default()
                    },
                    CacheLevel {
                        level: 2,
                        kind: "Unified".to_string(),
                        size: "1280K".to_string(),
                        ..Default::default()
                    },
                ],
                flags: "fpu vme".to_string(),
                times,
                usage: times.usage(),
                ..Default::default()
            }],
            packages: vec![PhysicalPackage {
                vendor: "AuthenticAMD".to_string(),
                core_count: 1,
                thread_count: 1,
                times,
                usage: times.usage(),
                ..Default::default()
            }],
        };
        CpuDevice::from_parts(topology, Vec::new(), Utc::now())
    }

    #[test]
    fn test_in_range_accessors() {
        let device = device();
        assert_eq!(device.physical_count(), 1);
        assert_eq!(device.processor_count(), 1);
        assert_eq!(device.vendor(0), "AuthenticAMD");
        assert_eq!(device.core_count(0), 1);
        assert_eq!(device.core_id(0), 3);
        assert_eq!(device.flags(0), "fpu vme");
        assert_eq!(device.stat().user, 10);
        assert_eq!(device.usage().total, 100);
        assert_eq!(device.processor_usage(0).idle, 90);
    }

    #[test]
    fn test_out_of_range_and_negative_sentinels() {
        let device = device();
        for idx in [1, 2, -1, i32::MIN] {
            assert_eq!(device.core_count(idx), -1);
            assert_eq!(device.thread_count(idx), -1);
            assert_eq!(device.physical_id(idx), -1);
            assert_eq!(device.core_id(idx), -1);
            assert_eq!(device.vendor(idx), "");
            assert_eq!(device.model(idx), "");
            assert_eq!(device.architecture(idx), "");
            assert_eq!(device.temperature(idx), "");
            assert_eq!(device.min_freq(idx), "");
            assert_eq!(device.max_freq(idx), "");
            assert_eq!(device.current_freq(idx), "");
            assert_eq!(device.flags(idx), "");
            assert_eq!(device.stepping(idx), "");
            assert_eq!(device.family(idx), "");
            assert_eq!(device.bogo_mips(idx), "");
            assert_eq!(device.cache(idx, CacheKind::All), "");
            assert_eq!(device.processor_stat(idx), CpuTimes::default());
            assert_eq!(device.processor_usage(idx), CpuUsage::default());
        }
    }

    #[test]
    fn test_cache_kinds() {
        let device = device();
        assert_eq!(device.cache(0, CacheKind::All), "512 KB");
        assert_eq!(device.cache(0, CacheKind::L1Data), "48K");
        assert_eq!(device.cache(0, CacheKind::L1Instruction), "32K");
        assert_eq!(device.cache(0, CacheKind::L2), "1280K");
        assert_eq!(device.cache(0, CacheKind::L3), "");
    }

    #[test]
    fn test_empty_device_aggregate_is_zero() {
        let device = CpuDevice::from_parts(Topology::default(), Vec::new(), Utc::now());
        assert_eq!(device.physical_count(), 0);
        assert_eq!(device.stat(), CpuTimes::default());
        assert_eq!(device.usage(), CpuUsage::default());
        assert_eq!(device.model(0), "");
    }

    #[test]
    fn test_collect_through_filesystem() {
        use crate::collector::MockFs;

        let before = Utc::now();
        let device = CpuDevice::collect(MockFs::single_socket_laptop(), &SourcePaths::default());

        assert!(device.collected_at() >= before);
        assert!(device.collected_at() <= Utc::now());
        assert_eq!(device.processor_count(), 4);
        assert_eq!(device.max_freq(0), "4000Mhz");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_new_reads_running_host() {
        let device = CpuDevice::new();

        assert!(device.collected_at() <= Utc::now());
        if device.processor_count() > 0 {
            assert!(device.physical_count() >= 1);
            assert_eq!(device.thread_count(0), device.processor_count());
        }
    }

    #[test]
    fn test_json_has_flat_topology() {
        let json = serde_json::to_value(device()).unwrap();
        assert!(json["processors"].is_array());
        assert_eq!(json["packages"][0]["vendor"], "AuthenticAMD");
        assert!(json["diagnostics"].as_array().unwrap().is_empty());
        assert!(json["collected_at"].is_string());
    }
}
