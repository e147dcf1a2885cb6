pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use memory::MemoryPeerStore;
pub use postgres::PostgresPeerStore;
pub use sqlite::SqlitePeerStore;
pub use trait_def::{PeerStore, StoreFetchError, StoreResult};
