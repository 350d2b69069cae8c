//! Range shifting for moves and deletions
//!
//! A move from `past` to `new` displaces every peer between the two slots by
//! exactly one position:
//!
//! ```text
//! past > new (toward the front):  peers in [new, past]  get +1
//! past < new (toward the back):   peers in [past, new]  get -1
//! ```
//!
//! Deleting the record at `rank` pulls every peer at or after it back by one.

use crate::domain::entities::{RankRange, RankUpdate, Record};
use crate::domain::errors::OrderError;
use crate::domain::value_objects::{OrderField, Rank};

/// Which peers a move touches and by how much.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovePlan {
    /// Same slot; nothing to shift
    Unchanged,
    /// Shift every peer in `range` by `delta`
    Shift { range: RankRange, delta: i64 },
}

/// Plan the peer shift for moving a record from `past` to `new`.
pub fn plan_move(past: i64, new: Rank) -> MovePlan {
    let new = new.get();
    if new == past {
        MovePlan::Unchanged
    } else if past > new {
        MovePlan::Shift {
            range: RankRange::between(new, past),
            delta: 1,
        }
    } else {
        MovePlan::Shift {
            range: RankRange::between(past, new),
            delta: -1,
        }
    }
}

/// Range of peers pulled back when the record at `rank` is removed.
pub fn delete_range(rank: Rank) -> RankRange {
    RankRange::at_least(rank.get())
}

/// Build one update per ranked record, offsetting its rank by `delta`.
/// Unranked records are skipped.
///
/// Fails without producing any update if one shifted rank would leave the
/// `i64` range.
pub fn shift_updates(
    records: &[Record],
    field: &OrderField,
    delta: i64,
) -> Result<Vec<RankUpdate>, OrderError> {
    records
        .iter()
        .filter_map(|record| record.rank.map(|rank| (record, rank)))
        .map(|(record, rank)| {
            let shifted = rank
                .checked_add(delta)
                .ok_or(OrderError::RankOverflow { rank, delta })?;
            Ok(RankUpdate {
                id: record.id.clone(),
                field: field.clone(),
                rank: shifted,
            })
        })
        .collect()
}

/// Peers that share the rank being deleted.
pub fn duplicates_of(records: &[Record], rank: Rank) -> usize {
    records
        .iter()
        .filter(|record| record.rank == Some(rank.get()))
        .count()
}
