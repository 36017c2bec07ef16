//! Input/output helpers.
//!
//! - observation CSV ingest for the builder (`ingest`)
//! - item table loading (`items`)
//! - schedule CSV read/write (`schedule`)
//! - JSON lookup-table export (`export`)
//! - append-only observations log (`feedback`)

pub mod export;
pub mod feedback;
pub mod ingest;
pub mod items;
pub mod schedule;

pub use export::*;
pub use feedback::*;
pub use ingest::*;
pub use items::*;
pub use schedule::*;
