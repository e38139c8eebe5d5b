//! # Salesboard Database Crate
//!
//! This crate is the data loader of the pipeline. It reads the four source
//! relations (`sales`, `goods`, `categs`, `stocks`) from the SQLite sales
//! database and joins them into the denormalized `Dataset`.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the workspace only ever sees
//!   `core_types` structs.
//! - **Read-only source:** The database file is opened read-only and is never
//!   written to.
//! - **Fail fast:** A missing file, table, column or an unparseable value aborts
//!   the load. Only sales with unresolvable references are dropped, and those are
//!   counted in the `JoinReport`.
//!
//! ## Public API
//!
//! - `connect`: Opens a read-only connection pool to the database file.
//! - `DbRepository`: Fetches the raw relations.
//! - `load_dataset` / `join_relations`: Build the denormalized snapshot.
//! - `DatasetCache`: Holds the snapshot for the lifetime of the process, with
//!   explicit `reload` and `invalidate`.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod cache;
pub mod connection;
pub mod error;
pub mod loader;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use cache::DatasetCache;
pub use connection::connect;
pub use error::DbError;
pub use loader::{join_relations, load_dataset};
pub use repository::{DbRepository, REQUIRED_TABLES};
