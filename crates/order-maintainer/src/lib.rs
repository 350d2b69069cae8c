//! # Order Maintainer
//!
//! Keeps an integer rank field dense (`1..=N`) within each partition of an
//! external document collection while callers insert, move and delete
//! records.
//!
//! ## Architecture
//!
//! - **Domain**: Records, partitions, validated values, errors, invariants,
//!   and the validation gate
//! - **Algorithms**: Move/delete shift planning and dense compaction
//! - **Ports**: Inbound (`OrderMaintenanceApi`) and Outbound
//!   (`OrderedCollectionStore`, `PartitionTransaction`)
//! - **Application**: `OrderMaintainer` service
//! - **Adapters**: `InMemoryCollectionStore`
//! - **IPC**: `RequestHandler` turning loose JSON requests into uniform
//!   `{ failed, message }` responses
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Dense Sequence | Ranks of a partition form exactly `1..=N` |
//! | 2 | Unique Ranks | No two records of a partition share a rank |
//! | 3 | Partition Scope | No operation reads or writes outside its filter |
//! | 4 | Gate First | Malformed arguments never reach the store |
//!
//! The caller remains responsible for writing the moved record's own rank
//! after `move_item`, and for deleting a record after
//! `close_gap_on_delete`.
//!
//! ## Usage
//!
//! ```ignore
//! use order_maintainer::{OrderMaintainer, OrderMaintenanceApi, Partition, PartitionFilter, OrderField};
//!
//! let service = OrderMaintainer::new(store);
//! let crops = Partition::new(
//!     PartitionFilter::all().with("season", season_id),
//!     OrderField::new("order")?,
//! )?;
//!
//! // New record goes to the end
//! let rank = service.next_order(&crops).await?;
//!
//! // Move a record from 4 to 2, then write its own rank
//! service.move_item(&id, Rank::new(2)?, 4, &crops).await?;
//! ```

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::{Document, InMemoryCollectionStore};
pub use application::service::OrderMaintainer;
pub use config::MaintainerConfig;
pub use domain::entities::*;
pub use domain::errors::{OrderError, StoreError, ValidationError};
pub use domain::value_objects::*;
pub use ipc::{OrderRequest, OrderResponse, RequestHandler};
pub use ports::inbound::OrderMaintenanceApi;
pub use ports::outbound::{OrderedCollectionStore, PartitionTransaction, RecordAccess};
