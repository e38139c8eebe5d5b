use crate::loader::load_dataset;
use crate::{DbError, DbRepository};
use core_types::Dataset;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds the loaded `Dataset` for the lifetime of the process.
///
/// The first `get` loads the snapshot; later calls hand out the same `Arc`.
/// The snapshot only changes through `reload` or `invalidate`.
#[derive(Debug)]
pub struct DatasetCache {
    repo: DbRepository,
    slot: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(repo: DbRepository) -> Self {
        Self {
            repo,
            slot: RwLock::new(None),
        }
    }

    /// Identity of the data source the cached snapshot belongs to.
    pub fn source(&self) -> &str {
        self.repo.source()
    }

    pub async fn is_loaded(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Returns the cached snapshot, loading it on first use.
    pub async fn get(&self) -> Result<Arc<Dataset>, DbError> {
        if let Some(dataset) = self.slot.read().await.as_ref() {
            return Ok(Arc::clone(dataset));
        }

        let mut slot = self.slot.write().await;
        if let Some(dataset) = slot.as_ref() {
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load_dataset(&self.repo).await?);
        *slot = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Loads a fresh snapshot and swaps it in.
    ///
    /// If the load fails the previous snapshot stays in place.
    pub async fn reload(&self) -> Result<Arc<Dataset>, DbError> {
        let mut slot = self.slot.write().await;
        let dataset = Arc::new(load_dataset(&self.repo).await?);
        *slot = Some(Arc::clone(&dataset));
        tracing::info!(source = %self.source(), "Sales dataset reloaded.");
        Ok(dataset)
    }

    /// Drops the snapshot; the next `get` reads the database again.
    pub async fn invalidate(&self) {
        self.slot.write().await.take();
        tracing::debug!(source = %self.source(), "Sales dataset cache cleared.");
    }
}
