use crate::models::{PeerId, PeerRecord};
use crate::storage::{PeerStore, StoreResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

/// Postgres keeps the address list as `TEXT[]`
#[derive(FromRow)]
struct PeerRow {
    id: i64,
    multi_addresses: Option<Vec<String>>,
}

impl From<PeerRow> for PeerRecord {
    fn from(row: PeerRow) -> Self {
        PeerRecord {
            id: row.id,
            addresses: row.multi_addresses.unwrap_or_default(),
        }
    }
}

pub struct PostgresPeerStore {
    pool: Arc<PgPool>,
}

impl PostgresPeerStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl PeerStore for PostgresPeerStore {
    async fn fetch_peers(&self) -> StoreResult<Vec<PeerRecord>> {
        let rows = sqlx::query_as::<_, PeerRow>(
            r#"
            SELECT id::BIGINT AS id, multi_addresses
            FROM peers
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(PeerRecord::from).collect())
    }

    async fn fetch_peers_by_ids(&self, ids: &[PeerId]) -> StoreResult<Vec<PeerRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PeerRow>(
            r#"
            SELECT id::BIGINT AS id, multi_addresses
            FROM peers
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(PeerRecord::from).collect())
    }
}
