use anyhow::Result;
use ordhent_model::{BulkSummary, Query, WriteOp};
use serde::de::DeserializeOwned;

pub mod config;
pub mod memory;
pub mod mongo;
pub mod save;

pub use config::{StoreConfig, StoreError};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use save::save;

/// A single collection of vocabulary documents.
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Documents matching `query`, reduced to `projection` (all fields when
    /// empty), at most `limit` of them.
    async fn find<T: DeserializeOwned>(
        &self,
        query: &Query,
        projection: &[&str],
        limit: Option<i64>,
    ) -> Result<Vec<T>>;

    /// Submit a batch in one request. Operations apply in order.
    async fn bulk_write(&self, operations: &[WriteOp]) -> Result<BulkSummary>;

    /// Release the connection (or flush the backing file).
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// The store chosen at startup.
pub enum Backend {
    Mongo(MongoStore),
    Memory(MemoryStore),
}

impl Store for Backend {
    async fn find<T: DeserializeOwned>(
        &self,
        query: &Query,
        projection: &[&str],
        limit: Option<i64>,
    ) -> Result<Vec<T>> {
        match self {
            Backend::Mongo(store) => store.find(query, projection, limit).await,
            Backend::Memory(store) => store.find(query, projection, limit).await,
        }
    }

    async fn bulk_write(&self, operations: &[WriteOp]) -> Result<BulkSummary> {
        match self {
            Backend::Mongo(store) => store.bulk_write(operations).await,
            Backend::Memory(store) => store.bulk_write(operations).await,
        }
    }

    async fn close(self) -> Result<()> {
        match self {
            Backend::Mongo(store) => store.close().await,
            Backend::Memory(store) => store.close().await,
        }
    }
}
