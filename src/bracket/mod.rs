//! Weight brackets: the shared core of the builder and the resolver.
//!
//! - `set`: canonical bracket bounds, labels and membership
//! - `table`: bracket → average cost
//! - `builder`: observations → table (offline)
//! - `resolver`: SKU → weight → bracket → cost (online)

pub mod builder;
pub mod resolver;
pub mod set;
pub mod table;

pub use builder::*;
pub use resolver::*;
pub use set::*;
pub use table::*;
