//! cpuscope-core - CPU inventory library for Linux hosts.
//!
//! Provides:
//! - `collector` - `/proc` and sysfs readers, the correlator and `MockFs`
//! - `device` - `CpuDevice`, the index-based query surface over one snapshot
//! - `models` - serializable processor, package and counter records
//! - `util` - helper utilities (machine architecture)

pub mod collector;
pub mod device;
pub mod models;
pub mod util;

pub use device::{CacheKind, CpuDevice};
