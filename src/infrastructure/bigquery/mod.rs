//! BigQuery adapters.

pub mod rest_adapter;
