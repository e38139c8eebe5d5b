//! # Salesboard Core Types
//!
//! The shared vocabulary of the workspace: the four source relations, the
//! denormalized `SalesRow` produced by the loader, and the immutable
//! `Dataset` snapshot that the filter and aggregation stages read from.
//!
//! This crate has no knowledge of storage or presentation.

pub mod dataset;
pub mod error;
pub mod parse;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use dataset::{Dataset, JoinReport};
pub use error::CoreError;
pub use parse::{parse_amount, parse_doc_date};
pub use structs::{Category, Good, SaleRecord, SalesRow, Stock};
