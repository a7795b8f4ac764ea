//! In-memory filesystem and canned host scenarios for tests.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
