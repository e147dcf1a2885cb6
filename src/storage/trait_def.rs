use crate::models::{PeerId, PeerRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Bulk peer reads failed; fatal to a pipeline run
#[derive(Debug, Error)]
pub enum StoreFetchError {
    #[error("peer query failed")]
    Query(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreFetchError>;

/// Read-only source of peer records
#[async_trait]
pub trait PeerStore: Send + Sync {
    /// Fetch every peer, ordered by id
    async fn fetch_peers(&self) -> StoreResult<Vec<PeerRecord>>;

    /// Fetch the given peers, ordered by id. Unknown ids are skipped.
    async fn fetch_peers_by_ids(&self, ids: &[PeerId]) -> StoreResult<Vec<PeerRecord>>;
}
