//! Reporting utilities: formatted terminal output for builds and lookups.

pub mod format;

pub use format::*;
