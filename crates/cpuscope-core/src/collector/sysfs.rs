//! Readers for per-CPU `sysfs` attributes and the hwmon temperature input.
//!
//! Each reader touches one leaf file and returns a unit-annotated string, or
//! an empty string with a diagnostic. Many kernels, drivers and containers
//! hide these nodes, so absence is logged at debug level only.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::diagnostic::{Diagnostic, Reading};
use crate::collector::traits::FileSystem;
use crate::models::CacheLevel;

/// Reads a kHz value and formats it as whole megahertz, e.g. "2400Mhz".
pub fn read_frequency<F: FileSystem>(fs: &F, path: &Path) -> Reading<String> {
    read_scaled(fs, path, "Mhz")
}

/// Reads a millidegree value and formats it as whole degrees, e.g. "47°C".
pub fn read_temperature<F: FileSystem>(fs: &F, path: &Path) -> Reading<String> {
    read_scaled(fs, path, "°C")
}

/// Reads an integer, divides it by 1000 and appends `suffix`.
fn read_scaled<F: FileSystem>(fs: &F, path: &Path, suffix: &str) -> Reading<String> {
    let content = match fs.read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "sysfs node unavailable");
            return Reading::degraded(String::new(), Diagnostic::unavailable(path, &e));
        }
    };

    let raw = content.lines().next().unwrap_or("").trim();
    match raw.parse::<i64>() {
        Ok(value) => Reading::ok(format!("{}{}", value / 1000, suffix)),
        Err(_) => {
            debug!(path = %path.display(), raw, "sysfs node is not an integer");
            Reading::degraded(
                String::new(),
                Diagnostic::malformed(path, format!("not an integer: {:?}", raw)),
            )
        }
    }
}

/// Frequency bounds for one processor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyLimits {
    pub min: Reading<String>,
    pub max: Reading<String>,
}

/// Reads `cpu<N>/...` attributes under a configurable sysfs CPU root.
pub struct SysfsReader<'a, F: FileSystem> {
    fs: &'a F,
    sys_cpu_path: PathBuf,
}

impl<'a, F: FileSystem> SysfsReader<'a, F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `sys_cpu_path` - Usually "/sys/devices/system/cpu"
    pub fn new(fs: &'a F, sys_cpu_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            sys_cpu_path: sys_cpu_path.into(),
        }
    }

    fn cpu_dir(&self, processor: u32) -> PathBuf {
        self.sys_cpu_path.join(format!("cpu{}", processor))
    }

    pub fn cpufreq_path(&self, processor: u32, leaf: &str) -> PathBuf {
        self.cpu_dir(processor).join("cpufreq").join(leaf)
    }

    /// `cpuinfo_min_freq` and `cpuinfo_max_freq`.
    pub fn read_frequency_limits(&self, processor: u32) -> FrequencyLimits {
        FrequencyLimits {
            min: read_frequency(self.fs, &self.cpufreq_path(processor, "cpuinfo_min_freq")),
            max: read_frequency(self.fs, &self.cpufreq_path(processor, "cpuinfo_max_freq")),
        }
    }

    /// `scaling_cur_freq`, used when `/proc/cpuinfo` has no `cpu MHz`.
    pub fn read_current_frequency(&self, processor: u32) -> Reading<String> {
        read_frequency(self.fs, &self.cpufreq_path(processor, "scaling_cur_freq"))
    }

    /// `topology/<leaf>` as an integer, e.g. `physical_package_id` or `core_id`.
    ///
    /// Read only for ids `/proc/cpuinfo` does not report (common on ARM).
    pub fn read_topology_id(&self, processor: u32, leaf: &str) -> Reading<Option<i32>> {
        let path = self.cpu_dir(processor).join("topology").join(leaf);
        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "topology node unavailable");
                return Reading::degraded(None, Diagnostic::unavailable(path, &e));
            }
        };

        let raw = content.trim();
        match raw.parse::<i32>() {
            Ok(id) => Reading::ok(Some(id)),
            Err(_) => {
                debug!(path = %path.display(), raw, "topology node is not an integer");
                Reading::degraded(
                    None,
                    Diagnostic::malformed(path, format!("not an integer: {:?}", raw)),
                )
            }
        }
    }

    /// All `cache/index<K>/` entries for `processor`, ordered by K.
    pub fn read_cache_levels(&self, processor: u32) -> Reading<Vec<CacheLevel>> {
        let cache_dir = self.cpu_dir(processor).join("cache");
        let entries = match self.fs.read_dir(&cache_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %cache_dir.display(), error = %e, "cache topology unavailable");
                return Reading::degraded(Vec::new(), Diagnostic::unavailable(cache_dir, &e));
            }
        };

        let mut indexed: Vec<(u32, PathBuf)> = entries
            .into_iter()
            .filter_map(|path| {
                let index = path
                    .file_name()?
                    .to_str()?
                    .strip_prefix("index")?
                    .parse::<u32>()
                    .ok()?;
                Some((index, path))
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);

        let levels = indexed
            .into_iter()
            .map(|(_, dir)| CacheLevel {
                level: self.read_attr(&dir, "level").parse().unwrap_or(0),
                kind: self.read_attr(&dir, "type"),
                size: self.read_attr(&dir, "size"),
                shared_cpu_list: self.read_attr(&dir, "shared_cpu_list"),
            })
            .collect();

        Reading::ok(levels)
    }

    fn read_attr(&self, dir: &Path, name: &str) -> String {
        self.fs
            .read_to_string(&dir.join(name))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}
