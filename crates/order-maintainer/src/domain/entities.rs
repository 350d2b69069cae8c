//! Core entities for Order Maintenance
//!
//! A partition is a filter plus the name of the rank field. Queries and
//! updates sent to the store are always built from a partition so that no
//! operation can escape its group.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use super::errors::ValidationError;
use super::value_objects::{FilterValue, OrderField, RecordId, ID_FIELD};

/// A stored record projected onto its rank field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// `None` when the document has no integer value for the rank field
    pub rank: Option<i64>,
}

impl Record {
    pub fn new(id: RecordId, rank: i64) -> Self {
        Self {
            id,
            rank: Some(rank),
        }
    }

    pub fn unranked(id: RecordId) -> Self {
        Self { id, rank: None }
    }
}

/// Field/value equality constraints selecting one ordering group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionFilter(BTreeMap<String, FilterValue>);

impl PartitionFilter {
    /// Filter matching the whole collection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality constraint.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.0.get(field)
    }

    /// Whether a document with the given fields satisfies every constraint.
    /// A missing field matches only `Null`.
    pub fn matches(&self, fields: &BTreeMap<String, FilterValue>) -> bool {
        self.0.iter().all(|(key, expected)| match fields.get(key) {
            Some(actual) => actual == expected,
            None => *expected == FilterValue::Null,
        })
    }

    /// Reject keys that collide with constraints owned by the maintainer.
    pub fn check_against(&self, order_field: &OrderField) -> Result<(), ValidationError> {
        for key in self.0.keys() {
            let reason = if key.is_empty() {
                Some("keys must be non-empty".to_string())
            } else if key.starts_with('$') {
                Some(format!("key {key:?} must not be an operator"))
            } else if key == ID_FIELD {
                Some(format!("must not constrain {ID_FIELD}"))
            } else if key == order_field.as_str() {
                Some(format!("must not constrain the order field {key:?}"))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ValidationError::InvalidFilter { reason });
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, FilterValue)> for PartitionFilter {
    fn from_iter<T: IntoIterator<Item = (String, FilterValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One ordering group: a filter and the field that holds its ranks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Partition {
    filter: PartitionFilter,
    order_field: OrderField,
}

impl Partition {
    /// Build a partition, rejecting filters that touch the id or rank field.
    pub fn new(filter: PartitionFilter, order_field: OrderField) -> Result<Self, ValidationError> {
        filter.check_against(&order_field)?;
        Ok(Self {
            filter,
            order_field,
        })
    }

    pub fn filter(&self) -> &PartitionFilter {
        &self.filter
    }

    pub fn order_field(&self) -> &OrderField {
        &self.order_field
    }

    /// Query over every record of the partition.
    pub fn query(&self) -> RankQuery {
        RankQuery {
            partition: self.clone(),
            exclude: None,
            range: RankRange::default(),
        }
    }

    /// Stable key identifying this partition, used for per-partition locking.
    pub fn key(&self) -> String {
        let mut key = self.order_field.as_str().to_string();
        for (field, value) in self.filter.iter() {
            key.push('|');
            key.push_str(field);
            key.push('=');
            key.push_str(&serde_json::to_string(value).unwrap_or_default());
        }
        key
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Inclusive rank bounds; an absent bound is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RankRange {
    pub fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether a record's rank falls in range. Unranked records only match
    /// an unbounded range.
    pub fn contains(&self, rank: Option<i64>) -> bool {
        match rank {
            Some(rank) => {
                self.min.is_none_or(|min| rank >= min) && self.max.is_none_or(|max| rank <= max)
            }
            None => self.is_unbounded(),
        }
    }
}

/// Query sent to the store: partition, optional excluded id, rank bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankQuery {
    pub partition: Partition,
    pub exclude: Option<RecordId>,
    pub range: RankRange,
}

impl RankQuery {
    pub fn excluding(mut self, id: &RecordId) -> Self {
        self.exclude = Some(id.clone());
        self
    }

    pub fn in_range(mut self, range: RankRange) -> Self {
        self.range = range;
        self
    }

    pub fn order_field(&self) -> &OrderField {
        self.partition.order_field()
    }

    /// Whether a record (by id and rank) is selected by the non-filter parts
    /// of the query. Filter matching is the store's job.
    pub fn selects(&self, record: &Record) -> bool {
        self.exclude.as_ref() != Some(&record.id) && self.range.contains(record.rank)
    }
}

/// One rank write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankUpdate {
    pub id: RecordId,
    pub field: OrderField,
    pub rank: i64,
}

/// Result of a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// New rank equals past rank; nothing written
    Unchanged,
    /// Peers between past and new rank were shifted by one slot
    Changed { shifted: usize },
}

impl MoveOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            MoveOutcome::Unchanged => "Order is same as before",
            MoveOutcome::Changed { .. } => "Order Changed Successfully",
        }
    }

    pub fn shifted(&self) -> usize {
        match self {
            MoveOutcome::Unchanged => 0,
            MoveOutcome::Changed { shifted } => *shifted,
        }
    }
}

/// Result of closing the gap left by a record about to be deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub shifted: usize,
}

impl ShiftReport {
    pub fn message(&self) -> &'static str {
        "Order Changed Successfully. Except the deleted document"
    }
}

/// Result of a full compaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderReport {
    /// Records in the partition
    pub total: usize,
    /// Records whose rank actually changed
    pub rewritten: usize,
}

impl ReorderReport {
    pub fn message(&self) -> &'static str {
        "All documents are reordered"
    }
}

/// Read-only density audit of a partition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionHealth {
    pub total: usize,
    pub max_rank: i64,
    /// Records with no integer rank
    pub unranked: usize,
    /// Runs of ranks in `1..=max_rank` held by no record
    pub gaps: Vec<RangeInclusive<i64>>,
    /// Ranks held by more than one record
    pub duplicates: Vec<i64>,
    /// Ranks below 1
    pub non_positive: Vec<i64>,
}

impl PartitionHealth {
    /// Ranks form exactly `1..=total`.
    pub fn is_dense(&self) -> bool {
        self.unranked == 0
            && self.gaps.is_empty()
            && self.duplicates.is_empty()
            && self.non_positive.is_empty()
            && self.max_rank == self.total as i64
    }
}
