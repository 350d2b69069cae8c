//! Integration flows over the in-memory adapter.

mod extremes;
mod failures;
mod flows;
