//! Locations of the kernel sources a snapshot is read from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root paths for every source the collector reads.
///
/// Defaults point at the live host; overriding them lets the collector read
/// a copied `/proc` + `/sys` tree (e.g. a host mount inside a container).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    /// Base path of procfs; `cpuinfo` and `stat` are read below it.
    pub proc_path: PathBuf,
    /// Directory holding the `cpu<N>` sysfs nodes.
    pub sys_cpu_path: PathBuf,
    /// Millidegree temperature input. Fixed, not discovered.
    pub temperature_input: PathBuf,
}

impl SourcePaths {
    pub const DEFAULT_PROC_PATH: &'static str = "/proc";
    pub const DEFAULT_SYS_CPU_PATH: &'static str = "/sys/devices/system/cpu";
    pub const DEFAULT_TEMPERATURE_INPUT: &'static str = "/sys/class/hwmon/hwmon1/temp1_input";

    pub fn with_proc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.proc_path = path.into();
        self
    }

    pub fn with_sys_cpu_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sys_cpu_path = path.into();
        self
    }

    pub fn with_temperature_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.temperature_input = path.into();
        self
    }
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            proc_path: PathBuf::from(Self::DEFAULT_PROC_PATH),
            sys_cpu_path: PathBuf::from(Self::DEFAULT_SYS_CPU_PATH),
            temperature_input: PathBuf::from(Self::DEFAULT_TEMPERATURE_INPUT),
        }
    }
}
