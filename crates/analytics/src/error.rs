use thiserror::Error;

/// Filtering and aggregation never fail; only writing results out can.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Failed to write CSV export: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error during export: {0}")]
    Io(#[from] std::io::Error),
}
