//! Shared test fixtures: a crop collection split by season.

use std::sync::Arc;

use order_maintainer::{
    Document, FilterValue, IdFormat, InMemoryCollectionStore, OrderError, OrderField, OrderMaintainer,
    OrderMaintenanceApi, Partition, PartitionFilter, Rank, RankUpdate, RecordAccess, RecordId,
};

pub const ORDER: &str = "order";

/// 24-hex identifier built from a counter.
pub fn object_id(n: u32) -> RecordId {
    RecordId::parse(&format!("{n:024x}"), IdFormat::ObjectId).expect("valid object id")
}

pub fn order_field() -> OrderField {
    OrderField::new(ORDER).expect("valid order field")
}

/// Partition of one season's crops.
pub fn season(name: &str) -> Partition {
    Partition::new(PartitionFilter::all().with("season", name), order_field())
        .expect("valid partition")
}

pub fn crop(n: u32, season: &str, order: i64) -> Document {
    Document::new(object_id(n))
        .with("season", season)
        .with(ORDER, order)
}

/// `count` densely ranked crops with ids starting at `first_id`.
pub fn ranked_season(name: &str, first_id: u32, count: u32) -> Vec<Document> {
    (0..count)
        .map(|i| crop(first_id + i, name, i64::from(i) + 1))
        .collect()
}

pub fn service(
    documents: Vec<Document>,
) -> (
    Arc<InMemoryCollectionStore>,
    OrderMaintainer<InMemoryCollectionStore>,
) {
    let store = Arc::new(InMemoryCollectionStore::with_documents(documents));
    let service = OrderMaintainer::new(Arc::clone(&store));
    (store, service)
}

/// Ranks of the given ids, in the given order.
pub fn ranks(store: &InMemoryCollectionStore, ids: &[u32]) -> Vec<Option<i64>> {
    ids.iter()
        .map(|n| store.rank_of(&object_id(*n), &order_field()))
        .collect()
}

/// Ids of a partition sorted by rank, for asserting final sequences.
pub fn sequence(store: &InMemoryCollectionStore, season_name: &str) -> Vec<(RecordId, i64)> {
    let field = order_field();
    let mut ranked: Vec<_> = store
        .documents()
        .into_iter()
        .filter(|d| d.fields.get("season") == Some(&FilterValue::from(season_name)))
        .filter_map(|d| d.rank(&field).map(|rank| (d.id, rank)))
        .collect();
    ranked.sort_by_key(|(_, rank)| *rank);
    ranked
}

/// The caller half of each operation: the parts the maintainer leaves to
/// whoever owns the records.
pub struct Caller<'a> {
    pub store: &'a InMemoryCollectionStore,
    pub service: &'a OrderMaintainer<InMemoryCollectionStore>,
}

impl Caller<'_> {
    /// Insert a crop at the end of its season.
    pub async fn insert(&self, n: u32, season_name: &str) -> Result<i64, OrderError> {
        let next = self.service.next_order(&season(season_name)).await?;
        self.store.insert(crop(n, season_name, next));
        Ok(next)
    }

    /// Move a crop, then write its own rank.
    pub async fn move_to(
        &self,
        n: u32,
        new: i64,
        past: i64,
        season_name: &str,
    ) -> Result<(), OrderError> {
        let id = object_id(n);
        let new = Rank::new(new)?;
        self.service
            .move_item(&id, new, past, &season(season_name))
            .await?;
        self.store
            .save(&RankUpdate {
                id,
                field: order_field(),
                rank: new.get(),
            })
            .await?;
        Ok(())
    }

    /// Close the gap of a crop, then delete it.
    pub async fn delete(&self, n: u32, rank: i64, season_name: &str) -> Result<(), OrderError> {
        let id = object_id(n);
        self.service
            .close_gap_on_delete(&id, Rank::new(rank)?, &season(season_name))
            .await?;
        self.store.remove(&id);
        Ok(())
    }
}
