//! Pricing core: description parsing and surcharge accumulation.
//!
//! - `parser` turns a free-text catalog description into an explicit
//!   `PriceTerms` schema (done once, at catalog-load time)
//! - `engine` folds terms + selected options + requested stroke into a
//!   deterministic base-currency total with an itemized log

pub mod engine;
pub mod parser;

pub use engine::*;
pub use parser::*;
