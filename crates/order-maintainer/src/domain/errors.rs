//! Error types for Order Maintenance
//!
//! Every operation reports failure as a value. The request handler flattens
//! these into the `{ failed, message }` response shape.

use thiserror::Error;

use super::value_objects::{IdFormat, RecordId};

/// All errors that can occur while maintaining ranks
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed arguments, detected before any store access
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Requested rank would leave a gap after the current maximum
    #[error("Order can not be greater than max order :{max}")]
    Bounds { requested: i64, max: i64 },

    /// Underlying store failure, surfaced verbatim
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A peer shares the rank being removed
    #[error("Duplicate order {rank} found in partition; reorder all documents first")]
    DuplicateRank { rank: i64 },

    /// A stored rank sits at the edge of the integer range and cannot move
    #[error("Order {rank} can not be shifted by {delta}; reorder all documents first")]
    RankOverflow { rank: i64, delta: i64 },

    /// Affected set exceeds the configured limit
    #[error("Partition too large: {size} > {max}")]
    PartitionTooLarge { size: usize, max: usize },
}

impl OrderError {
    pub fn is_validation(&self) -> bool {
        matches!(self, OrderError::Validation(_))
    }

    pub fn is_bounds(&self) -> bool {
        matches!(self, OrderError::Bounds { .. })
    }

    pub fn is_store(&self) -> bool {
        matches!(self, OrderError::Store(_))
    }

    /// Whether the partition may be left non-dense and should be compacted
    /// with a full reorder before further shifting.
    pub fn needs_compaction(&self) -> bool {
        matches!(
            self,
            OrderError::DuplicateRank { .. }
                | OrderError::RankOverflow { .. }
                | OrderError::Store(StoreError::WriteFailed { .. })
        )
    }
}

/// Argument shape errors raised by the validation gate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("_id with value {value} fails to match the {format:?} pattern")]
    InvalidRecordId { value: String, format: IdFormat },

    #[error("{field} must be an integer")]
    NotAnInteger { field: &'static str },

    #[error("{field} must be greater than or equal to {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        value: i64,
        min: i64,
    },

    #[error("order_field {name:?} {reason}")]
    InvalidOrderField { name: String, reason: &'static str },

    #[error("query_obj {reason}")]
    InvalidFilter { reason: String },
}

/// Errors reported by an ordered collection store adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to save record {id}: {reason}")]
    WriteFailed { id: RecordId, reason: String },

    #[error("Record not found: {id}")]
    RecordNotFound { id: RecordId },

    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Transaction already closed")]
    TransactionClosed,

    #[error("Store backend error: {0}")]
    Backend(String),
}
