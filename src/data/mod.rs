//! External data access.
//!
//! Currently a single concern: live exchange-rate lookups with a
//! time-bounded cache and an offline fallback (`rates`).

pub mod rates;

pub use rates::*;
