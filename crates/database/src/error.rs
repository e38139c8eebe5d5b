use core_types::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Sales database not found at '{0}'")]
    SourceMissing(PathBuf),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Required table '{0}' is missing from the sales database")]
    MissingTable(String),

    #[error("Malformed value in table '{table}': {source}")]
    InvalidValue {
        table: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("Table '{table}' contains key '{key}' more than once")]
    DuplicateKey { table: &'static str, key: String },
}

impl DbError {
    pub(crate) fn invalid(table: &'static str) -> impl FnOnce(CoreError) -> Self {
        move |source| DbError::InvalidValue { table, source }
    }
}
