//! # Ports
//!
//! Traits the application layer depends on. Adapters in `infrastructure`
//! implement them for BigQuery, MySQL and moka; `mocks` implements them in
//! memory for unit tests.

pub mod cache_port;
pub mod describe_port;
pub mod warehouse_port;

#[cfg(test)]
pub(crate) mod mocks;
