//! Domain invariants for Order Maintenance
//!
//! The target state of every partition is a dense sequence: ranks are unique
//! positive integers forming exactly `1..=N`.

use super::entities::{PartitionHealth, Record};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// INVARIANT-1: Dense Sequence
/// Ranks of `records` form exactly `{1, ..., N}` with no duplicates.
pub fn invariant_dense(records: &[Record]) -> bool {
    audit(records).is_dense()
}

/// INVARIANT-2: Unique Ranks
/// No two ranked records share a rank.
pub fn invariant_unique_ranks(records: &[Record]) -> bool {
    audit(records).duplicates.is_empty()
}

/// Build a density report for the given partition contents.
pub fn audit(records: &[Record]) -> PartitionHealth {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    let mut unranked = 0;

    for record in records {
        match record.rank {
            Some(rank) => *counts.entry(rank).or_default() += 1,
            None => unranked += 1,
        }
    }

    let max_rank = counts.keys().next_back().copied().unwrap_or(0).max(0);
    let gaps = missing_runs(counts.keys().copied());
    let duplicates = counts
        .iter()
        .filter(|(_, &n)| n > 1)
        .map(|(&rank, _)| rank)
        .collect();
    let non_positive = counts.keys().copied().filter(|&r| r < 1).collect();

    PartitionHealth {
        total: records.len(),
        max_rank,
        unranked,
        gaps,
        duplicates,
        non_positive,
    }
}

/// Missing runs of `1..=max` given the held ranks in ascending order.
///
/// Work is proportional to the number of distinct ranks, not their size.
fn missing_runs(held: impl Iterator<Item = i64>) -> Vec<RangeInclusive<i64>> {
    let mut runs = Vec::new();
    let mut last = 0_i64;
    for rank in held.filter(|&r| r >= 1) {
        // rank > last >= 0, so neither bound can overflow
        if rank > last + 1 {
            runs.push(last + 1..=rank - 1);
        }
        last = rank;
    }
    runs
}
