//! Configuration for Order Maintenance

use serde::{Deserialize, Serialize};
use std::env;

use crate::domain::value_objects::{DuplicatePolicy, IdFormat};

/// Maintainer configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintainerConfig {
    /// Accepted record identifier shape
    pub id_format: IdFormat,
    /// Maximum rank writes in flight per operation (0 is treated as 1)
    pub write_concurrency: usize,
    /// Maximum records one operation may touch (anti-DoS)
    pub max_partition_size: usize,
    /// What to do when a peer shares the rank of a record being deleted
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for MaintainerConfig {
    fn default() -> Self {
        Self {
            id_format: IdFormat::ObjectId,
            write_concurrency: 16,
            max_partition_size: 100_000,
            duplicate_policy: DuplicatePolicy::Shift,
        }
    }
}

impl MaintainerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ORDER_ID_FORMAT`: `object_id` or `opaque` (default: object_id)
    /// - `ORDER_WRITE_CONCURRENCY`: writes in flight (default: 16)
    /// - `ORDER_MAX_PARTITION_SIZE`: records per operation (default: 100000)
    /// - `ORDER_DUPLICATE_POLICY`: `shift` or `reject` (default: shift)
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            id_format: lookup("ORDER_ID_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.id_format),
            write_concurrency: lookup("ORDER_WRITE_CONCURRENCY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.write_concurrency),
            max_partition_size: lookup("ORDER_MAX_PARTITION_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_partition_size),
            duplicate_policy: lookup("ORDER_DUPLICATE_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.duplicate_policy),
        }
    }

    /// Effective number of concurrent writes.
    pub fn effective_concurrency(&self) -> usize {
        self.write_concurrency.max(1)
    }
}
