//! MySQL adapters.

pub mod connection_manager;
pub mod describe_adapter;
