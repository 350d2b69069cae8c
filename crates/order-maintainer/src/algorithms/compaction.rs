//! Dense-sequence compaction
//!
//! Records are ordered by current rank (unranked first, ties keep the order
//! the store returned them in) and assigned `1, 2, 3, ...`.

use crate::domain::entities::{RankUpdate, Record};
use crate::domain::value_objects::OrderField;

/// Stable sort by rank, unranked records first.
pub fn sort_by_rank(records: &mut [Record]) {
    // Option orders None before Some, matching ascending store sorts.
    records.sort_by_key(|record| record.rank);
}

/// Assign dense ranks to `records` in their current order.
///
/// Only records whose rank changes produce an update.
pub fn compaction_updates(records: &[Record], field: &OrderField) -> Vec<RankUpdate> {
    records
        .iter()
        .zip(1_i64..)
        .filter(|(record, dense)| record.rank != Some(*dense))
        .map(|(record, dense)| RankUpdate {
            id: record.id.clone(),
            field: field.clone(),
            rank: dense,
        })
        .collect()
}
