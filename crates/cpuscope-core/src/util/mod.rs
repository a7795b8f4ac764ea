//! Utility modules for cpuscope.

mod arch;

pub use arch::{UNAME_SOURCE, machine_architecture};
