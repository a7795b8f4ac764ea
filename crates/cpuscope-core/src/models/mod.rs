//! Snapshot records: logical processors, physical packages, time counters.

mod cpu;

pub use cpu::*;
