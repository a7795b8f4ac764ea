//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! `MockFs` simulates a filesystem in memory so the CPU collector can be
//! exercised on any host, including ones without cpufreq or hwmon.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Adds `cpuinfo_min_freq` / `cpuinfo_max_freq` (kHz) for one CPU under
    /// `/sys/devices/system/cpu`.
    pub fn add_cpufreq(&mut self, processor: u32, min_khz: u64, max_khz: u64) {
        let base = PathBuf::from(format!("/sys/devices/system/cpu/cpu{}/cpufreq", processor));
        self.add_file(base.join("cpuinfo_min_freq"), format!("{}\n", min_khz));
        self.add_file(base.join("cpuinfo_max_freq"), format!("{}\n", max_khz));
    }

    /// Adds `topology/physical_package_id` and `topology/core_id` for one CPU
    /// under `/sys/devices/system/cpu`.
    pub fn add_topology(&mut self, processor: u32, package_id: i32, core_id: i32) {
        let base = PathBuf::from(format!("/sys/devices/system/cpu/cpu{}/topology", processor));
        self.add_file(base.join("physical_package_id"), format!("{}\n", package_id));
        self.add_file(base.join("core_id"), format!("{}\n", core_id));
    }

    /// Adds one `cache/index<K>/` directory for a CPU under
    /// `/sys/devices/system/cpu`.
    ///
    /// # Arguments
    /// * `processor` - CPU number
    /// * `index` - `K` in `index<K>`
    /// * `level` - Content of `level`
    /// * `kind` - Content of `type` ("Data", "Instruction", "Unified")
    /// * `size` - Content of `size` (e.g. "32K")
    /// * `shared_cpu_list` - Content of `shared_cpu_list` (e.g. "0,4")
    pub fn add_cache(
        &mut self,
        processor: u32,
        index: u32,
        level: u8,
        kind: &str,
        size: &str,
        shared_cpu_list: &str,
    ) {
        let base = PathBuf::from(format!(
            "/sys/devices/system/cpu/cpu{}/cache/index{}",
            processor, index
        ));
        self.add_file(base.join("level"), format!("{}\n", level));
        self.add_file(base.join("type"), format!("{}\n", kind));
        self.add_file(base.join("size"), format!("{}\n", size));
        self.add_file(base.join("shared_cpu_list"), format!("{}\n", shared_cpu_list));
    }

    /// Loads a directory captured from a real host (e.g. `cp -r /proc/cpuinfo
    /// /sys/devices/system/cpu ...`) and mounts it at `virtual_root`.
    ///
    /// Useful for regression tests against real machines.
    pub fn from_snapshot(dir: &Path, virtual_root: &Path) -> io::Result<Self> {
        let mut fs = Self::new();
        load_directory_recursive(&mut fs, dir, virtual_root)?;
        Ok(fs)
    }
}

fn load_directory_recursive(
    fs: &mut MockFs,
    real_path: &Path,
    virtual_path: &Path,
) -> io::Result<()> {
    fs.add_dir(virtual_path);

    for entry in std::fs::read_dir(real_path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let real_child = entry.path();
        let virtual_child = virtual_path.join(entry.file_name());

        if file_type.is_dir() {
            load_directory_recursive(fs, &real_child, &virtual_child)?;
        } else if file_type.is_file() {
            // Try to read as string, skip binary files
            if let Ok(content) = std::fs::read_to_string(&real_child) {
                fs.add_file(&virtual_child, content);
            }
        }
    }
    Ok(())
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        // Direct children only
        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}
