//! # Infrastructure Adapters
//!
//! Concrete implementations of the ports: BigQuery over its REST API,
//! MySQL `DESCRIBE` through pooled connections, and an in-process moka cache.

pub mod bigquery;
pub mod cache;
pub mod mysql;
