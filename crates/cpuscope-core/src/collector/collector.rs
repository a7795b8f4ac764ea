//! Runs every reader once and hands the results to the correlator.

use chrono::Utc;
use tracing::debug;

use crate::collector::correlate::{ProcessorSide, SideData, correlate};
use crate::collector::diagnostic::Reading;
use crate::collector::paths::SourcePaths;
use crate::collector::procfs::ProcReader;
use crate::collector::sysfs::{SysfsReader, read_temperature};
use crate::collector::traits::FileSystem;
use crate::device::CpuDevice;
use crate::util::machine_architecture;

/// Builds `CpuDevice` snapshots from a filesystem.
///
/// Collection is synchronous and infallible: unreadable sources become empty
/// fields plus an entry in `CpuDevice::diagnostics()`.
pub struct CpuCollector<F: FileSystem> {
    fs: F,
    paths: SourcePaths,
    architecture: Option<String>,
}

impl<F: FileSystem> CpuCollector<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `paths` - Where `/proc`, the sysfs CPU tree and hwmon input live
    pub fn new(fs: F, paths: SourcePaths) -> Self {
        Self {
            fs,
            paths,
            architecture: None,
        }
    }

    /// Uses `architecture` instead of calling `uname(2)`.
    ///
    /// Useful when the filesystem belongs to another host.
    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = Some(architecture.into());
        self
    }

    pub fn paths(&self) -> &SourcePaths {
        &self.paths
    }

    /// Reads all sources once and returns the frozen snapshot.
    pub fn collect(&self) -> CpuDevice {
        let mut diagnostics = Vec::new();

        let proc = ProcReader::new(&self.fs, &self.paths.proc_path);
        let stat = proc.read_cpu_stat().into_value(&mut diagnostics);
        let cpuinfo = proc.read_cpuinfo().into_value(&mut diagnostics);

        let sysfs = SysfsReader::new(&self.fs, &self.paths.sys_cpu_path);
        let mut side = SideData::default();
        for block in cpuinfo.sorted_by_index() {
            let index: u32 = block
                .get("processor")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            if side.processors.contains_key(&index) {
                continue;
            }

            let limits = sysfs.read_frequency_limits(index);
            let has_cpuinfo_mhz = block.get("cpu MHz").is_some_and(|v| !v.is_empty());
            let frequency_current = if has_cpuinfo_mhz {
                String::new()
            } else {
                sysfs.read_current_frequency(index).into_value(&mut diagnostics)
            };

            let package_id = if block.contains_key("physical id") {
                None
            } else {
                sysfs
                    .read_topology_id(index, "physical_package_id")
                    .into_value(&mut diagnostics)
            };
            let core_id = if block.contains_key("core id") {
                None
            } else {
                sysfs.read_topology_id(index, "core_id").into_value(&mut diagnostics)
            };

            side.processors.insert(
                index,
                ProcessorSide {
                    frequency_min: limits.min.into_value(&mut diagnostics),
                    frequency_max: limits.max.into_value(&mut diagnostics),
                    frequency_current,
                    caches: sysfs.read_cache_levels(index).into_value(&mut diagnostics),
                    package_id,
                    core_id,
                },
            );
        }

        if !cpuinfo.is_empty() {
            let architecture = match &self.architecture {
                Some(arch) => Reading::ok(arch.clone()),
                None => machine_architecture(),
            };
            side.architecture = architecture.into_value(&mut diagnostics);
            side.temperature = read_temperature(&self.fs, &self.paths.temperature_input)
                .into_value(&mut diagnostics);
        }

        let topology = correlate(&cpuinfo, &stat, &side);
        debug!(
            processors = topology.processors.len(),
            packages = topology.packages.len(),
            package_hint = cpuinfo.package_hint(),
            stat_lines = stat.len(),
            diagnostics = diagnostics.len(),
            "cpu snapshot collected"
        );

        CpuDevice::from_parts(topology, diagnostics, Utc::now())
    }
}
