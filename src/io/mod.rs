//! Input/output helpers.
//!
//! - catalog CSV ingest + validation (`catalog`)

pub mod catalog;

pub use catalog::*;
