//! Outbound Ports (Driven Ports / SPI)
//!
//! The ordered collection store the host application must provide.
//!
//! Every rank-shifting operation runs inside a [`PartitionTransaction`]:
//! acquired with [`OrderedCollectionStore::begin`] at operation start, ended
//! with `commit` or `rollback`. Dropping an unfinished transaction must
//! discard its writes and release the partition.

use crate::domain::entities::{Partition, RankQuery, RankUpdate, Record};
use crate::domain::errors::StoreError;
use crate::domain::value_objects::SortDirection;
use async_trait::async_trait;

/// Read and write access to ranked records.
#[async_trait]
pub trait RecordAccess: Send + Sync {
    /// All records matching `query`, in the store's natural order.
    async fn find(&self, query: &RankQuery) -> Result<Vec<Record>, StoreError>;

    /// Records matching `query`, sorted by the query's order field.
    ///
    /// Ties keep natural order. Unranked records sort first ascending and
    /// last descending.
    async fn find_sorted(
        &self,
        query: &RankQuery,
        direction: SortDirection,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Persist one rank. Independent saves may be issued concurrently.
    async fn save(&self, update: &RankUpdate) -> Result<(), StoreError>;
}

/// Scoped handle holding one partition for the duration of an operation.
#[async_trait]
pub trait PartitionTransaction: RecordAccess {
    /// Make every save of this transaction visible and release the partition.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard every save of this transaction and release the partition.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Ordered collection store
///
/// Production: a document database adapter implemented by the host.
/// Testing: `InMemoryCollectionStore` (adapters/memory.rs)
#[async_trait]
pub trait OrderedCollectionStore: RecordAccess {
    /// Open a transaction scoped to `partition`.
    ///
    /// Implementations must serialise transactions on the same partition.
    async fn begin(&self, partition: &Partition) -> Result<Box<dyn PartitionTransaction>, StoreError>;
}
