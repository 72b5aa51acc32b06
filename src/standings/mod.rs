//! End-of-season standings.
//!
//! Tallies finished games into per-player [`Standing`]s, ranks them by
//! points (two per win, one per draw), then spread, then username, and
//! marks promotion, relegation and stay outcomes.
//!
//! Recalculation from the full game list is idempotent. [`StandingsCalculator::record_game`]
//! applies a single result incrementally while a season is in progress.
//!
//! [`Standing`]: crate::model::Standing

mod calculator;

pub use calculator::{DivisionPosition, StandingsCalculator};
