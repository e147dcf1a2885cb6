//! Pipeline driver
//!
//! Fetches all peers once, enriches each, and tallies the outcomes. A run
//! either returns the complete [`Aggregate`] or an error; per-address
//! failures never stop it.

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::aggregate::{Aggregate, Aggregator};
use crate::enrich::{Enricher, Enrichment};
use crate::models::{CountryCode, PeerId, PeerRecord};
use crate::storage::{PeerStore, StoreFetchError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch peers")]
    Fetch(#[from] StoreFetchError),
    #[error("enrichment worker failed")]
    Worker(#[from] tokio::task::JoinError),
}

pub struct Pipeline {
    store: Arc<dyn PeerStore>,
    enricher: Enricher,
}

impl Pipeline {
    pub fn new(store: Arc<dyn PeerStore>, enricher: Enricher) -> Self {
        Self { store, enricher }
    }

    /// Enrich every peer in store order on the current task
    pub async fn run(&self) -> Result<Aggregate, PipelineError> {
        let peers = self.fetch_all().await?;

        let aggregate = tally(&self.enricher, &peers);
        log_finished(&aggregate);
        Ok(aggregate)
    }

    /// Enrich peers on up to `workers` blocking threads.
    ///
    /// Each worker tallies a contiguous chunk of the peers; partial results
    /// are merged in chunk order, so the outcome is identical to [`run`](Self::run).
    pub async fn run_parallel(&self, workers: usize) -> Result<Aggregate, PipelineError> {
        if workers <= 1 {
            return self.run().await;
        }

        let peers = self.fetch_all().await?;
        if peers.is_empty() {
            let aggregate = Aggregate::default();
            log_finished(&aggregate);
            return Ok(aggregate);
        }

        // More workers than peers would only spawn empty chunks
        let workers = workers.min(peers.len());
        let chunk_size = peers.len().div_ceil(workers);
        let mut peers = peers;
        let mut chunks = Vec::with_capacity(workers);
        while peers.len() > chunk_size {
            let rest = peers.split_off(chunk_size);
            chunks.push(peers);
            peers = rest;
        }
        chunks.push(peers);

        info!("Enriching with {} workers", chunks.len());

        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let enricher = self.enricher.clone();
                tokio::task::spawn_blocking(move || tally(&enricher, &chunk))
            })
            .collect();

        let mut aggregator = Aggregator::new();
        for handle in handles {
            aggregator.merge(handle.await?);
        }

        let aggregate = aggregator.finish();
        log_finished(&aggregate);
        Ok(aggregate)
    }

    /// Country of each requested peer, `unknown` when none of its addresses
    /// resolve. Ids missing from the store are left out.
    pub async fn locate(
        &self,
        ids: &[PeerId],
    ) -> Result<BTreeMap<PeerId, CountryCode>, PipelineError> {
        let peers = self.store.fetch_peers_by_ids(ids).await?;

        Ok(peers
            .iter()
            .map(|peer| {
                let country = match self.enricher.enrich(peer) {
                    Enrichment::Country(country) => country,
                    Enrichment::Unresolved(_) => CountryCode::unknown(),
                };
                (peer.id, country)
            })
            .collect())
    }

    async fn fetch_all(&self) -> Result<Vec<PeerRecord>, PipelineError> {
        let peers = self.store.fetch_peers().await?;
        info!("Fetched {} peers", peers.len());
        Ok(peers)
    }
}

fn tally(enricher: &Enricher, peers: &[PeerRecord]) -> Aggregate {
    let mut aggregator = Aggregator::new();
    for peer in peers {
        aggregator.record(enricher.enrich(peer));
    }
    aggregator.finish()
}

fn log_finished(aggregate: &Aggregate) {
    info!(
        "Located {} peers in {} countries, {} unresolved",
        aggregate.resolved_peers(),
        aggregate.counts().len(),
        aggregate.unresolved().len()
    );
}
