//! Order Maintenance Service
//!
//! Main service implementing OrderMaintenanceApi.
//!
//! Every operation follows the same pipeline:
//! 1. Open a partition transaction
//! 2. Read the affected rank range
//! 3. Plan the new ranks
//! 4. Write them as a bounded concurrent batch
//! 5. Commit, or roll back on any error

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::algorithms::{
    compaction_updates, delete_range, duplicates_of, plan_move, shift_updates, sort_by_rank,
    MovePlan,
};
use crate::config::MaintainerConfig;
use crate::domain::entities::{
    MoveOutcome, Partition, PartitionHealth, RankUpdate, ReorderReport, ShiftReport,
};
use crate::domain::errors::{OrderError, StoreError};
use crate::domain::invariants::audit;
use crate::domain::value_objects::{DuplicatePolicy, Rank, RecordId, SortDirection};
use crate::ports::inbound::OrderMaintenanceApi;
use crate::ports::outbound::{OrderedCollectionStore, PartitionTransaction, RecordAccess};

/// Order Maintenance Service
///
/// Keeps ranks dense within each partition of the backing store. Callers
/// still own record creation, deletion and the moved record's own rank.
pub struct OrderMaintainer<S> {
    store: Arc<S>,
    config: MaintainerConfig,
}

impl<S: OrderedCollectionStore> OrderMaintainer<S> {
    /// Create a new service with default config
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, MaintainerConfig::default())
    }

    /// Create a new service with custom config
    pub fn with_config(store: Arc<S>, config: MaintainerConfig) -> Self {
        Self { store, config }
    }

    /// Active configuration
    pub fn config(&self) -> &MaintainerConfig {
        &self.config
    }

    /// Backing store, shared with the caller
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn check_size(&self, size: usize) -> Result<(), OrderError> {
        if size > self.config.max_partition_size {
            return Err(OrderError::PartitionTooLarge {
                size,
                max: self.config.max_partition_size,
            });
        }
        Ok(())
    }

    async fn write_all<A>(&self, access: &A, updates: &[RankUpdate]) -> Result<usize, StoreError>
    where
        A: RecordAccess + ?Sized,
    {
        let saves: Vec<_> = updates.iter().map(|update| access.save(update)).collect();
        stream::iter(saves)
            .buffer_unordered(self.config.effective_concurrency())
            .try_collect::<Vec<()>>()
            .await?;
        Ok(updates.len())
    }

    async fn move_within<A>(
        &self,
        access: &A,
        id: &RecordId,
        new: Rank,
        past: i64,
        partition: &Partition,
    ) -> Result<MoveOutcome, OrderError>
    where
        A: RecordAccess + ?Sized,
    {
        let max = max_in(access, partition).await?;
        if new.get() > max {
            return Err(OrderError::Bounds {
                requested: new.get(),
                max,
            });
        }

        let MovePlan::Shift { range, delta } = plan_move(past, new) else {
            return Ok(MoveOutcome::Unchanged);
        };

        let query = partition.query().excluding(id).in_range(range);
        debug!(?range, delta, "Shifting peers for move");
        let peers = access
            .find_sorted(&query, SortDirection::Ascending, None)
            .await?;
        self.check_size(peers.len())?;

        let updates = shift_updates(&peers, partition.order_field(), delta)?;
        let shifted = self.write_all(access, &updates).await?;
        Ok(MoveOutcome::Changed { shifted })
    }

    async fn close_gap_within<A>(
        &self,
        access: &A,
        id: &RecordId,
        rank: Rank,
        partition: &Partition,
    ) -> Result<ShiftReport, OrderError>
    where
        A: RecordAccess + ?Sized,
    {
        let query = partition.query().excluding(id).in_range(delete_range(rank));
        let peers = access
            .find_sorted(&query, SortDirection::Ascending, None)
            .await?;
        self.check_size(peers.len())?;

        let duplicates = duplicates_of(&peers, rank);
        if duplicates > 0 {
            warn!(
                rank = rank.get(),
                duplicates,
                policy = ?self.config.duplicate_policy,
                "Peer shares the deleted rank; partition is not dense"
            );
            if self.config.duplicate_policy == DuplicatePolicy::Reject {
                return Err(OrderError::DuplicateRank { rank: rank.get() });
            }
        }

        let updates = shift_updates(&peers, partition.order_field(), -1)?;
        let shifted = self.write_all(access, &updates).await?;
        Ok(ShiftReport { shifted })
    }

    async fn reorder_within<A>(&self, access: &A, partition: &Partition) -> Result<ReorderReport, OrderError>
    where
        A: RecordAccess + ?Sized,
    {
        let mut records = access
            .find_sorted(&partition.query(), SortDirection::Ascending, None)
            .await?;
        self.check_size(records.len())?;
        sort_by_rank(&mut records);

        let updates = compaction_updates(&records, partition.order_field());
        let rewritten = self.write_all(access, &updates).await?;
        Ok(ReorderReport {
            total: records.len(),
            rewritten,
        })
    }

    async fn inspect_within<A>(
        &self,
        access: &A,
        partition: &Partition,
    ) -> Result<PartitionHealth, OrderError>
    where
        A: RecordAccess + ?Sized,
    {
        let records = access.find(&partition.query()).await?;
        self.check_size(records.len())?;
        Ok(audit(&records))
    }
}

impl<S: OrderedCollectionStore> Clone for OrderMaintainer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

/// Highest rank in the partition, or 0.
async fn max_in<A>(access: &A, partition: &Partition) -> Result<i64, StoreError>
where
    A: RecordAccess + ?Sized,
{
    let top = access
        .find_sorted(&partition.query(), SortDirection::Descending, Some(1))
        .await?;
    Ok(top.first().and_then(|r| r.rank).unwrap_or(0))
}

/// End a transaction according to the operation result.
async fn finish<T>(txn: Box<dyn PartitionTransaction>, result: Result<T, OrderError>) -> Result<T, OrderError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            warn!(error = %err, "Rolling back partition transaction");
            if let Err(rollback) = txn.rollback().await {
                warn!(error = %rollback, "Rollback failed; partition may need reorder_all");
            }
            Err(err)
        }
    }
}

#[async_trait]
impl<S: OrderedCollectionStore> OrderMaintenanceApi for OrderMaintainer<S> {
    async fn max_order(&self, partition: &Partition) -> Result<i64, OrderError> {
        let txn = self.store.begin(partition).await?;
        let result = max_in(&*txn, partition).await.map_err(OrderError::from);
        let max = finish(txn, result).await?;

        debug!(partition = %partition, max, "Computed max order");
        Ok(max)
    }

    async fn move_item(
        &self,
        id: &RecordId,
        new: Rank,
        past: i64,
        partition: &Partition,
    ) -> Result<MoveOutcome, OrderError> {
        let txn = self.store.begin(partition).await?;
        let result = self.move_within(&*txn, id, new, past, partition).await;
        let outcome = finish(txn, result).await?;

        info!(
            id = %id,
            past,
            new = new.get(),
            field = %partition.order_field(),
            shifted = outcome.shifted(),
            "{}",
            outcome.message()
        );
        Ok(outcome)
    }

    async fn close_gap_on_delete(
        &self,
        id: &RecordId,
        rank: Rank,
        partition: &Partition,
    ) -> Result<ShiftReport, OrderError> {
        let txn = self.store.begin(partition).await?;
        let result = self.close_gap_within(&*txn, id, rank, partition).await;
        let report = finish(txn, result).await?;

        info!(
            id = %id,
            rank = rank.get(),
            field = %partition.order_field(),
            shifted = report.shifted,
            "Closed rank gap ahead of deletion"
        );
        Ok(report)
    }

    async fn reorder_all(&self, partition: &Partition) -> Result<ReorderReport, OrderError> {
        let txn = self.store.begin(partition).await?;
        let result = self.reorder_within(&*txn, partition).await;
        let report = finish(txn, result).await?;

        info!(
            partition = %partition,
            total = report.total,
            rewritten = report.rewritten,
            "Partition reordered"
        );
        Ok(report)
    }

    async fn inspect(&self, partition: &Partition) -> Result<PartitionHealth, OrderError> {
        let txn = self.store.begin(partition).await?;
        let result = self.inspect_within(&*txn, partition).await;
        let health = finish(txn, result).await?;

        if !health.is_dense() {
            warn!(
                partition = %partition,
                gaps = health.gaps.len(),
                duplicates = health.duplicates.len(),
                unranked = health.unranked,
                "Partition is not dense"
            );
        }
        Ok(health)
    }
}
