//! Domain types used throughout the quotation pipeline.
//!
//! This module defines:
//!
//! - the configurable option set (`OptionKey`, `OptionSelection`)
//! - the parsed pricing schema (`PriceTerms`, `StrokeRule`)
//! - pricing outputs (`Quote`, `LineItem`)
//! - currency identifiers (`Currency`)

pub mod types;

pub use types::*;
