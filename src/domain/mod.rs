//! # Domain Layer
//!
//! Pure types and rules with no I/O: schema fields, describe rows, prepared
//! rows, the native-to-warehouse type table, wait policies and errors.

pub mod entities;
pub mod errors;
pub mod model;
pub mod types;
pub mod wait;
