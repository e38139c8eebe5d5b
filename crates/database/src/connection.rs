use crate::error::DbError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// Opens a read-only connection pool to the SQLite sales database at `path`.
///
/// The file must already exist; it is never created.
pub async fn connect(path: &Path) -> Result<SqlitePool, DbError> {
    if !path.is_file() {
        return Err(DbError::SourceMissing(path.to_path_buf()));
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    tracing::debug!(path = %path.display(), "Opened sales database.");
    Ok(pool)
}
