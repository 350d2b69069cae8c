//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{MoveOutcome, Partition, PartitionHealth, ReorderReport, ShiftReport};
use crate::domain::errors::OrderError;
use crate::domain::value_objects::{Rank, RecordId};
use async_trait::async_trait;

/// Primary Order Maintenance API
#[async_trait]
pub trait OrderMaintenanceApi: Send + Sync {
    /// Highest rank in the partition, `0` when it has no ranked record.
    async fn max_order(&self, partition: &Partition) -> Result<i64, OrderError>;

    /// Rank to give a record about to be inserted: `max_order + 1`.
    async fn next_order(&self, partition: &Partition) -> Result<i64, OrderError> {
        let max = self.max_order(partition).await?;
        max.checked_add(1)
            .ok_or(OrderError::RankOverflow { rank: max, delta: 1 })
    }

    /// Make room for `id` at `new` by shifting the peers between `past` and
    /// `new` one slot. The record's own rank is left to the caller.
    async fn move_item(
        &self,
        id: &RecordId,
        new: Rank,
        past: i64,
        partition: &Partition,
    ) -> Result<MoveOutcome, OrderError>;

    /// Pull back every peer at or after `rank` before the caller deletes `id`.
    async fn close_gap_on_delete(
        &self,
        id: &RecordId,
        rank: Rank,
        partition: &Partition,
    ) -> Result<ShiftReport, OrderError>;

    /// Rewrite the partition as the dense sequence `1..=N`.
    async fn reorder_all(&self, partition: &Partition) -> Result<ReorderReport, OrderError>;

    /// Read-only density audit.
    async fn inspect(&self, partition: &Partition) -> Result<PartitionHealth, OrderError>;
}
