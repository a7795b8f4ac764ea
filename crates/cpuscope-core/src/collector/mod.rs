//! CPU inventory collector for Linux.
//!
//! This module reads `/proc/cpuinfo`, `/proc/stat`, the per-CPU sysfs tree
//! and one hwmon temperature input, then joins them into a frozen
//! [`CpuDevice`](crate::CpuDevice). Every source goes through the
//! [`FileSystem`] trait so the whole pipeline runs against [`MockFs`] in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CpuCollector                         │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │     ProcReader      │   │        SysfsReader          │  │
//! │  │  - /proc/cpuinfo    │   │  - cpu<N>/cpufreq/*         │  │
//! │  │  - /proc/stat       │   │  - cpu<N>/cache/index<K>/*  │  │
//! │  └──────────┬──────────┘   │  - hwmon temp input         │  │
//! │             │              └──────────────┬──────────────┘  │
//! │             └────────► correlate ◄────────┘                 │
//! │                            │                                │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use cpuscope_core::collector::{CpuCollector, RealFs, SourcePaths};
//!
//! let device = CpuCollector::new(RealFs::new(), SourcePaths::default()).collect();
//! println!("{} sockets", device.physical_count());
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use cpuscope_core::collector::{CpuCollector, MockFs, SourcePaths};
//!
//! let fs = MockFs::single_socket_laptop();
//! let device = CpuCollector::new(fs, SourcePaths::default())
//!     .with_architecture("x86_64")
//!     .collect();
//! assert_eq!(device.processor_count(), 4);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod correlate;
mod diagnostic;
pub mod mock;
mod paths;
pub mod procfs;
pub mod sysfs;
pub mod traits;

pub use collector::CpuCollector;
pub use correlate::{ProcessorSide, SideData, correlate};
pub use diagnostic::{Diagnostic, DiagnosticKind, Reading};
pub use mock::MockFs;
pub use paths::SourcePaths;
pub use procfs::{CpuInfoTable, ParseError, ProcReader, StatTable};
pub use sysfs::{FrequencyLimits, SysfsReader};
pub use traits::{FileSystem, RealFs};
