//! Cache adapters.

pub mod moka_cache;
