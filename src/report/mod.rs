//! Quotation reporting.
//!
//! We keep formatting code in one place so:
//! - the pricing/weight code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;
