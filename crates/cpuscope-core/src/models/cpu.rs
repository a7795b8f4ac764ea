//! CPU inventory records produced by the correlator.
//!
//! Two levels: one `LogicalProcessor` per OS-visible CPU and one
//! `PhysicalPackage` per distinct `physical id`. Both are plain data and are
//! never mutated once a snapshot is built.

use serde::{Deserialize, Serialize};

/// Cumulative scheduler time-in-state counters from `/proc/stat`.
///
/// Source: one `cpu`/`cpuN` line of `/proc/stat`.
///
/// All values are jiffies since boot.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct CpuTimes {
    /// Time spent in user mode.
    /// Source: `/proc/stat` column 1
    pub user: u64,

    /// Time spent in user mode with low priority (nice).
    /// Source: `/proc/stat` column 2
    pub nice: u64,

    /// Time spent in system/kernel mode.
    /// Source: `/proc/stat` column 3
    pub system: u64,

    /// Time spent idle.
    /// Source: `/proc/stat` column 4
    pub idle: u64,

    /// Time waiting for I/O to complete.
    /// Source: `/proc/stat` column 5
    pub iowait: u64,

    /// Time servicing hardware interrupts.
    /// Source: `/proc/stat` column 6
    pub irq: u64,

    /// Time servicing software interrupts.
    /// Source: `/proc/stat` column 7
    pub softirq: u64,

    /// Time stolen by the hypervisor for other VMs.
    /// Source: `/proc/stat` column 8
    pub steal: u64,

    /// Time spent running a guest OS.
    /// Source: `/proc/stat` column 9
    pub guest: u64,

    /// Time spent running a niced guest OS.
    /// Source: `/proc/stat` column 10
    pub guest_nice: u64,
}

impl CpuTimes {
    /// Counters in `/proc/stat` column order.
    pub fn as_array(&self) -> [u64; 10] {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
            self.guest,
            self.guest_nice,
        ]
    }

    /// Derives the busy/idle summary for these counters.
    pub fn usage(&self) -> CpuUsage {
        CpuUsage {
            total: self.as_array().iter().fold(0u64, |acc, v| acc.wrapping_add(*v)),
            idle: self.idle.wrapping_add(self.iowait),
        }
    }
}

/// Busy/idle summary derived from `CpuTimes`.
///
/// No percentage is stored: a snapshot is a single point in time, so callers
/// diff two snapshots (see [`usage_between`]).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct CpuUsage {
    /// Sum of all ten counters.
    pub total: u64,
    /// `idle + iowait`.
    pub idle: u64,
}

impl CpuUsage {
    /// Jiffies spent doing anything other than idling or waiting on I/O.
    pub fn busy(&self) -> u64 {
        self.total.saturating_sub(self.idle)
    }
}

/// Busy fraction (0.0..=1.0) between two usage samples of the same CPU.
///
/// Returns `None` when `later.total` did not advance past `earlier.total`,
/// which covers identical snapshots and counter regressions.
pub fn usage_between(earlier: &CpuUsage, later: &CpuUsage) -> Option<f64> {
    let total = later.total.checked_sub(earlier.total)?;
    if total == 0 {
        return None;
    }
    let idle = later.idle.saturating_sub(earlier.idle).min(total);
    Some((total - idle) as f64 / total as f64)
}

/// One cache described under `/sys/devices/system/cpu/cpuN/cache/indexK/`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct CacheLevel {
    /// Source: `indexK/level`
    pub level: u8,
    /// "Data", "Instruction" or "Unified".
    /// Source: `indexK/type`
    pub kind: String,
    /// Kernel formatted size, e.g. "32K".
    /// Source: `indexK/size`
    pub size: String,
    /// Source: `indexK/shared_cpu_list`
    pub shared_cpu_list: String,
}

/// One OS-visible CPU (hardware thread).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct LogicalProcessor {
    /// Source: `processor` in `/proc/cpuinfo`
    pub processor_index: u32,
    /// Source: `physical id` in `/proc/cpuinfo` (0 when absent)
    pub package_id: i32,
    /// Source: `core id` in `/proc/cpuinfo` (0 when absent)
    pub core_id: i32,
    /// Human readable, e.g. "8192 KB".
    /// Source: `cache size` in `/proc/cpuinfo`
    pub cache_size_all: String,
    /// Per-level caches from sysfs, ordered by index directory.
    pub caches: Vec<CacheLevel>,
    pub flags: String,
    pub stepping: String,
    pub family: String,
    pub bogo_mips: String,
    /// `cpu MHz` verbatim, or sysfs `scaling_cur_freq` as "NMhz" when
    /// cpuinfo has no such field.
    pub frequency_current: String,
    /// Source: `cpufreq/cpuinfo_min_freq`, e.g. "800Mhz"
    pub frequency_min: String,
    /// Source: `cpufreq/cpuinfo_max_freq`, e.g. "4200Mhz"
    pub frequency_max: String,
    pub times: CpuTimes,
    pub usage: CpuUsage,
}

/// One physical socket.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct PhysicalPackage {
    pub package_id: i32,
    /// Source: `vendor_id` in `/proc/cpuinfo`
    pub vendor: String,
    /// Source: `model name` in `/proc/cpuinfo`
    pub model: String,
    /// Machine field of `uname(2)`, e.g. "x86_64".
    pub architecture: String,
    /// Source: `cpu cores` in `/proc/cpuinfo`
    pub core_count: i32,
    /// Logical processors on the whole host, not just this package.
    pub thread_count: i32,
    /// e.g. "47°C", empty when the sensor is unreachable.
    pub temperature: String,
    /// Whole-machine aggregate (`cpu` line of `/proc/stat`).
    pub times: CpuTimes,
    pub usage: CpuUsage,
}

/// Both collections of one snapshot, in processor-index order.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Topology {
    pub processors: Vec<LogicalProcessor>,
    pub packages: Vec<PhysicalPackage>,
}
