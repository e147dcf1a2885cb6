use crate::address::parse_address_list;
use crate::models::{PeerId, PeerRecord};
use crate::storage::{PeerStore, StoreResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;

/// Stay well below SQLite's bound parameter limit
const IDS_PER_QUERY: usize = 500;

/// SQLite keeps the address list as a `{a,b,...}` text column
#[derive(FromRow)]
struct PeerRow {
    id: i64,
    multi_addresses: Option<String>,
}

impl From<PeerRow> for PeerRecord {
    fn from(row: PeerRow) -> Self {
        PeerRecord {
            id: row.id,
            addresses: row
                .multi_addresses
                .as_deref()
                .map(parse_address_list)
                .unwrap_or_default(),
        }
    }
}

pub struct SqlitePeerStore {
    pool: Arc<SqlitePool>,
}

impl SqlitePeerStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the peers table if it does not exist yet
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS peers (
                id INTEGER PRIMARY KEY,
                multi_addresses TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PeerStore for SqlitePeerStore {
    async fn fetch_peers(&self) -> StoreResult<Vec<PeerRecord>> {
        let rows = sqlx::query_as::<_, PeerRow>(
            r#"
            SELECT id, multi_addresses
            FROM peers
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(PeerRecord::from).collect())
    }

    async fn fetch_peers_by_ids(&self, ids: &[PeerId]) -> StoreResult<Vec<PeerRecord>> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut peers = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IDS_PER_QUERY) {
            let mut query =
                QueryBuilder::<Sqlite>::new("SELECT id, multi_addresses FROM peers WHERE id IN (");
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(") ORDER BY id");

            let rows = query
                .build_query_as::<PeerRow>()
                .fetch_all(self.pool.as_ref())
                .await?;
            peers.extend(rows.into_iter().map(PeerRecord::from));
        }

        Ok(peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_store() -> SqlitePeerStore {
        // A single connection keeps every query on the same in-memory database
        let store = SqlitePeerStore::new("sqlite::memory:", 1).await.unwrap();
        store.init().await.unwrap();
        store
    }

    async fn insert(store: &SqlitePeerStore, id: i64, addresses: Option<&str>) {
        sqlx::query("INSERT INTO peers (id, multi_addresses) VALUES (?, ?)")
            .bind(id)
            .bind(addresses)
            .execute(store.pool.as_ref())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_peers_decodes_address_lists() {
        let store = create_store().await;
        insert(
            &store,
            2,
            Some("{/ip6/::/tcp/37374,/ip4/151.252.13.181/tcp/37374}"),
        )
        .await;
        insert(&store, 1, Some("{/ip4/188.63.76.112/tcp/4001}")).await;
        insert(&store, 3, None).await;
        insert(&store, 4, Some("{}")).await;

        let peers = store.fetch_peers().await.unwrap();
        assert_eq!(
            peers,
            vec![
                PeerRecord::new(1, ["/ip4/188.63.76.112/tcp/4001"]),
                PeerRecord::new(2, ["/ip6/::/tcp/37374", "/ip4/151.252.13.181/tcp/37374"]),
                PeerRecord::new(3, Vec::<String>::new()),
                PeerRecord::new(4, Vec::<String>::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_peers_by_ids() {
        let store = create_store().await;
        for id in 1..=5 {
            insert(&store, id, Some(&format!("{{/ip4/10.0.0.{id}/tcp/1}}"))).await;
        }

        let peers = store.fetch_peers_by_ids(&[4, 2, 99, 2]).await.unwrap();
        let ids: Vec<i64> = peers.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(peers[0].addresses, vec!["/ip4/10.0.0.2/tcp/1"]);

        assert!(store.fetch_peers_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_peers_by_many_ids() {
        let store = create_store().await;
        for id in 0..1200 {
            insert(&store, id, Some("{/ip4/10.0.0.1/tcp/1}")).await;
        }

        let ids: Vec<i64> = (0..1200).rev().collect();
        let peers = store.fetch_peers_by_ids(&ids).await.unwrap();
        assert_eq!(peers.len(), 1200);
        assert!(peers.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_fetch_without_table_fails() {
        let store = SqlitePeerStore::new("sqlite::memory:", 1).await.unwrap();
        assert!(store.fetch_peers().await.is_err());
    }
}
