//! Readers for the `/proc` files the CPU snapshot is built from.

use std::path::PathBuf;

use tracing::warn;

use crate::collector::diagnostic::{Diagnostic, Reading};
use crate::collector::procfs::parser::{CpuInfoTable, StatTable, parse_cpu_stat, parse_cpuinfo};
use crate::collector::traits::FileSystem;

/// Reads `/proc/cpuinfo` and `/proc/stat` under a configurable proc root.
pub struct ProcReader<'a, F: FileSystem> {
    fs: &'a F,
    proc_path: PathBuf,
}

impl<'a, F: FileSystem> ProcReader<'a, F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: &'a F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    pub fn cpuinfo_path(&self) -> PathBuf {
        self.proc_path.join("cpuinfo")
    }

    pub fn stat_path(&self) -> PathBuf {
        self.proc_path.join("stat")
    }

    /// Reads the per-processor table from `/proc/cpuinfo`.
    ///
    /// A missing or unreadable file yields an empty table.
    pub fn read_cpuinfo(&self) -> Reading<CpuInfoTable> {
        let path = self.cpuinfo_path();
        match self.fs.read_to_string(&path) {
            Ok(content) => Reading::ok(parse_cpuinfo(&content)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cpuinfo unavailable");
                Reading::degraded(CpuInfoTable::default(), Diagnostic::unavailable(path, &e))
            }
        }
    }

    /// Reads the `cpu` lines of `/proc/stat`.
    ///
    /// A missing file yields an empty table; a short `cpu` line keeps the
    /// lines parsed before it.
    pub fn read_cpu_stat(&self) -> Reading<StatTable> {
        let path = self.stat_path();
        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "stat unavailable");
                return Reading::degraded(StatTable::default(), Diagnostic::unavailable(path, &e));
            }
        };

        let table = parse_cpu_stat(&content);
        let Some(reason) = table.malformed.as_ref().map(|e| e.message.clone()) else {
            return Reading::ok(table);
        };
        warn!(
            path = %path.display(),
            kept = table.len(),
            "stat parse failed: {}",
            reason
        );
        Reading::degraded(table, Diagnostic::malformed(path, reason))
    }
}
