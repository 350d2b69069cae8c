//! In-memory ordered collection store
//!
//! Reference adapter for tests and tooling. Documents keep insertion order,
//! which is the natural order used to break rank ties.
//!
//! Transactions take an owned per-partition lock and buffer their saves
//! until commit, so a failed batch leaves the collection untouched.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::domain::entities::{Partition, RankQuery, RankUpdate, Record};
use crate::domain::errors::StoreError;
use crate::domain::value_objects::{FilterValue, OrderField, RecordId, SortDirection};
use crate::ports::outbound::{OrderedCollectionStore, PartitionTransaction, RecordAccess};

/// A stored document: identifier plus scalar fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FilterValue>,
}

impl Document {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn rank(&self, field: &OrderField) -> Option<i64> {
        self.fields.get(field.as_str()).and_then(FilterValue::as_integer)
    }
}

type Documents = Arc<RwLock<Vec<Document>>>;
type PartitionLocks = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// In-memory collection for unit tests and the CLI.
#[derive(Default)]
pub struct InMemoryCollectionStore {
    documents: Documents,
    locks: PartitionLocks,
    failing: Arc<Mutex<HashSet<RecordId>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new();
        for document in documents {
            store.insert(document);
        }
        store
    }

    /// Insert or replace a document.
    pub fn insert(&self, document: Document) {
        let mut docs = self.documents.write();
        match docs.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => docs.push(document),
        }
    }

    /// Physically delete a document. Returns whether it existed.
    pub fn remove(&self, id: &RecordId) -> bool {
        let mut docs = self.documents.write();
        let before = docs.len();
        docs.retain(|d| &d.id != id);
        docs.len() != before
    }

    /// Snapshot of every document in natural order.
    pub fn documents(&self) -> Vec<Document> {
        self.documents.read().clone()
    }

    pub fn rank_of(&self, id: &RecordId, field: &OrderField) -> Option<i64> {
        self.documents
            .read()
            .iter()
            .find(|d| &d.id == id)
            .and_then(|d| d.rank(field))
    }

    /// Number of rank writes made visible so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every save of `id` fail until cleared.
    pub fn fail_writes_for(&self, id: &RecordId) {
        self.failing.lock().insert(id.clone());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().clear();
    }

    fn partition_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    #[cfg(test)]
    fn tracked_partitions(&self) -> usize {
        self.locks.lock().len()
    }
}

fn select(docs: &[Document], query: &RankQuery, pending: Option<&HashMap<RecordId, RankUpdate>>) -> Vec<Record> {
    let field = query.order_field();
    docs.iter()
        .filter(|d| query.partition.filter().matches(&d.fields))
        .map(|d| {
            let rank = pending
                .and_then(|p| p.get(&d.id))
                .filter(|u| &u.field == field)
                .map(|u| u.rank)
                .or_else(|| d.rank(field));
            Record {
                id: d.id.clone(),
                rank,
            }
        })
        .filter(|r| query.selects(r))
        .collect()
}

fn sort_and_limit(mut records: Vec<Record>, direction: SortDirection, limit: Option<usize>) -> Vec<Record> {
    match direction {
        SortDirection::Ascending => records.sort_by_key(|r| r.rank),
        SortDirection::Descending => records.sort_by(|a, b| b.rank.cmp(&a.rank)),
    }
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}

fn check_writable(failing: &Mutex<HashSet<RecordId>>, update: &RankUpdate) -> Result<(), StoreError> {
    if failing.lock().contains(&update.id) {
        return Err(StoreError::WriteFailed {
            id: update.id.clone(),
            reason: "injected failure".to_string(),
        });
    }
    Ok(())
}

fn apply(docs: &mut [Document], update: &RankUpdate) -> Result<(), StoreError> {
    let doc = docs
        .iter_mut()
        .find(|d| d.id == update.id)
        .ok_or_else(|| StoreError::RecordNotFound {
            id: update.id.clone(),
        })?;
    doc.fields
        .insert(update.field.as_str().to_string(), FilterValue::Integer(update.rank));
    Ok(())
}

#[async_trait]
impl RecordAccess for InMemoryCollectionStore {
    async fn find(&self, query: &RankQuery) -> Result<Vec<Record>, StoreError> {
        Ok(select(&self.documents.read(), query, None))
    }

    async fn find_sorted(
        &self,
        query: &RankQuery,
        direction: SortDirection,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let records = select(&self.documents.read(), query, None);
        Ok(sort_and_limit(records, direction, limit))
    }

    async fn save(&self, update: &RankUpdate) -> Result<(), StoreError> {
        check_writable(&self.failing, update)?;
        apply(&mut self.documents.write(), update)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl OrderedCollectionStore for InMemoryCollectionStore {
    async fn begin(&self, partition: &Partition) -> Result<Box<dyn PartitionTransaction>, StoreError> {
        let key = partition.key();
        let guard = self.partition_lock(&key).lock_owned().await;
        debug!(partition = %partition, "Partition transaction opened");

        Ok(Box::new(MemoryTransaction {
            key,
            locks: Arc::clone(&self.locks),
            documents: Arc::clone(&self.documents),
            failing: Arc::clone(&self.failing),
            writes: Arc::clone(&self.writes),
            pending: Mutex::new(HashMap::new()),
            _guard: guard,
        }))
    }
}

/// Buffered transaction over one partition of an [`InMemoryCollectionStore`].
struct MemoryTransaction {
    key: String,
    locks: PartitionLocks,
    documents: Documents,
    failing: Arc<Mutex<HashSet<RecordId>>>,
    writes: Arc<AtomicUsize>,
    pending: Mutex<HashMap<RecordId, RankUpdate>>,
    /// Held until the transaction is committed, rolled back or dropped
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl RecordAccess for MemoryTransaction {
    async fn find(&self, query: &RankQuery) -> Result<Vec<Record>, StoreError> {
        let pending = self.pending.lock();
        Ok(select(&self.documents.read(), query, Some(&pending)))
    }

    async fn find_sorted(
        &self,
        query: &RankQuery,
        direction: SortDirection,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let records = {
            let pending = self.pending.lock();
            select(&self.documents.read(), query, Some(&pending))
        };
        Ok(sort_and_limit(records, direction, limit))
    }

    async fn save(&self, update: &RankUpdate) -> Result<(), StoreError> {
        check_writable(&self.failing, update)?;
        if !self.documents.read().iter().any(|d| d.id == update.id) {
            return Err(StoreError::RecordNotFound {
                id: update.id.clone(),
            });
        }
        self.pending.lock().insert(update.id.clone(), update.clone());
        Ok(())
    }
}

#[async_trait]
impl PartitionTransaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let pending = std::mem::take(&mut *self.pending.lock());
        let mut docs = self.documents.write();
        // Every target must still exist before the first write lands.
        if let Some(missing) = pending
            .keys()
            .find(|id| !docs.iter().any(|d| &d.id == *id))
        {
            return Err(StoreError::RecordNotFound {
                id: missing.clone(),
            });
        }
        for update in pending.values() {
            apply(&mut docs, update)?;
        }
        self.writes.fetch_add(pending.len(), Ordering::SeqCst);
        debug!(writes = pending.len(), "Partition transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let discarded = self.pending.lock().len();
        debug!(discarded, "Partition transaction rolled back");
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        // The map and our own guard are the only owners when nobody else
        // holds or waits on this partition.
        let mut locks = self.locks.lock();
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2)
        {
            locks.remove(&self.key);
        }
    }
}
