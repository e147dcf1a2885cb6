use crate::models::{PeerId, PeerRecord};
use crate::storage::{PeerStore, StoreResult};
use async_trait::async_trait;

/// Peer store over records already held in memory.
///
/// Ids are not required to be unique: every record given is returned, in
/// id order, with records sharing an id kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryPeerStore {
    peers: Vec<PeerRecord>,
}

impl MemoryPeerStore {
    pub fn new(peers: impl IntoIterator<Item = PeerRecord>) -> Self {
        let mut peers: Vec<PeerRecord> = peers.into_iter().collect();
        peers.sort_by_key(|peer| peer.id);
        Self { peers }
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[async_trait]
impl PeerStore for MemoryPeerStore {
    async fn fetch_peers(&self) -> StoreResult<Vec<PeerRecord>> {
        Ok(self.peers.clone())
    }

    async fn fetch_peers_by_ids(&self, ids: &[PeerId]) -> StoreResult<Vec<PeerRecord>> {
        Ok(self
            .peers
            .iter()
            .filter(|peer| ids.contains(&peer.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_orders_by_id() {
        let store = MemoryPeerStore::new([
            PeerRecord::new(3, ["/ip4/1.1.1.1/tcp/1"]),
            PeerRecord::new(1, ["/ip4/2.2.2.2/tcp/1"]),
        ]);
        assert_eq!(store.len(), 2);

        let ids: Vec<i64> = store.fetch_peers().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let ids: Vec<i64> = store
            .fetch_peers_by_ids(&[3, 7, 3, 1])
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_memory_store_keeps_records_sharing_an_id() {
        let store = MemoryPeerStore::new([
            PeerRecord::new(1, ["/ip4/1.1.1.1/tcp/1"]),
            PeerRecord::new(1, ["/ip4/2.2.2.2/tcp/1"]),
        ]);
        assert_eq!(store.len(), 2);

        let peers = store.fetch_peers().await.unwrap();
        assert_eq!(peers[0].addresses, vec!["/ip4/1.1.1.1/tcp/1"]);
        assert_eq!(peers[1].addresses, vec!["/ip4/2.2.2.2/tcp/1"]);
        assert_eq!(store.fetch_peers_by_ids(&[1]).await.unwrap().len(), 2);
    }
}
