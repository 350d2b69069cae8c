//! Ports module for Order Maintenance
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::OrderMaintenanceApi;
pub use outbound::{OrderedCollectionStore, PartitionTransaction, RecordAccess};
