//! Division partitioning by dynamic programming.
//!
//! Given players sorted by priority, finds the number of divisions and the
//! contiguous block boundaries that minimize total cost:
//!
//! - a **size penalty** per division, quadratic in the distance from the
//!   ideal size plus a linear surcharge outside the ideal range;
//! - a **placement penalty** per player, by how far the assigned division
//!   is from their target. Pushing an already-relegated player down again
//!   is the most expensive move; pulling a safe player up is the cheapest.
//!
//! Division 1 receives the top-priority block, division 2 the next, and so
//! on, so who gets bumped follows directly from the priority order.
//!
//! # References
//!
//! Optimal contiguous partitioning (linear partition DP): Skiena (2008),
//! "The Algorithm Design Manual", §8.5

mod config;
mod cost;
mod solver;
mod types;

pub use config::{CostWeights, PartitionConfig};
pub use cost::{division_cost, player_penalty, size_penalty};
pub use solver::PartitionSolver;
pub use types::{PartitionBlock, PartitionPlayer, PartitionResult, PlayerKind};
