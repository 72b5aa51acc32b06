//! Placement targets and priority ordering.
//!
//! Turns last season's outcomes into next season's targets:
//!
//! - **Status**: NEW, GRADUATED, hiatus variants, or the carried-forward
//!   PROMOTED / RELEGATED / STAYED outcome, from the player's history.
//! - **Virtual division**: the provisional target division. Returning
//!   players move one step by outcome; graduates follow the graduation
//!   grouping; a small NEW cohort splits by rating across the bottom two
//!   divisions.
//! - **Priority**: one sortable score per player. Target division dominates,
//!   then outcome, then previous rank, all decayed by time away.
//!
//! Sorting by priority is the contract the partitioner relies on: it assigns
//! divisions to contiguous blocks of the sorted sequence.
//!
//! # References
//!
//! Composite priority ordering follows lexicographic dispatching-rule
//! composition: Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

mod config;
mod priority;
mod runner;
mod status;
mod virtual_division;

pub use config::{OutcomeBonus, PriorityConfig};
pub use priority::PriorityScorer;
pub use runner::PlacementRunner;
pub use status::{correct_status, placement_status, PlacementStatusUpdater, SHORT_HIATUS_MAX};
pub use virtual_division::VirtualDivisionAssigner;
