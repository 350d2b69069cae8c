//! Rank planning algorithms
//!
//! Pure functions that decide which records move and to which rank. The
//! application service feeds them store results and persists their output.

pub mod compaction;
pub mod shift;


pub use compaction::{compaction_updates, sort_by_rank};
pub use shift::{delete_range, duplicates_of, plan_move, shift_updates, MovePlan};
