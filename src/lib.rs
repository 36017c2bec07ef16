//! `shipcost` library crate.
//!
//! The binary (`shipcost`) is a thin wrapper around this library so that:
//!
//! - bracket building and lookups are testable without spawning processes
//! - the same resolver serves the CLI, the prompt and the JSON export

pub mod app;
pub mod bracket;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
