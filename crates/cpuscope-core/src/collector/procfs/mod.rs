//! Readers and parsers for the Linux `/proc` filesystem.

pub mod parser;
pub mod system;

pub use parser::{CpuInfoBlock, CpuInfoTable, CpuStatLine, ParseError, StatTable};
pub use system::ProcReader;
