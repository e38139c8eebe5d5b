//! # Salesboard Analytics
//!
//! The filter and aggregation stages of the sales pipeline.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** Nothing here touches storage. Every function takes a slice
//!   of `SalesRow`s and returns a new value; the input is never mutated.
//! - **Explicit parameters:** The date range and store selection travel in a
//!   `SalesFilter`, the aggregation knobs in `AnalyticsSettings`. There is no
//!   ambient state.
//!
//! ## Public API
//!
//! - `SalesFilter` / `StoreSelection`: The filter stage.
//! - `AnalyticsEngine`: Trend, category totals, top products and summary statistics.
//! - `DashboardReport`: All views bundled for presentation.
//! - `export`: CSV export of a filtered row set.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod bucket;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use filter::{SalesFilter, StoreSelection};
pub use report::{
    CategoryShare, CategoryTotals, DashboardReport, ProductTotal, SalesSummary, TrendPoint,
};
