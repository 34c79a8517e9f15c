use std::time::Duration;
use thiserror::Error;

/// 文档存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("commit timed out after {0:?}")]
    Timeout(Duration),
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: &'static str, id: String },
    #[error("commit rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// 批量清理错误
#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read collection {collection}: {source}")]
    Read {
        collection: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("batch #{batch} failed to commit ({committed} batches already applied): {source}")]
    Commit {
        batch: usize,
        committed: usize,
        #[source]
        source: StoreError,
    },
}
