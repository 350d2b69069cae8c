//! Request boundary for Order Maintenance
//!
//! Loosely-typed requests in, uniform `{ failed, message }` responses out.

pub mod handler;
pub mod payloads;

pub use handler::RequestHandler;
pub use payloads::{OrderRequest, OrderResponse};
