//! Season lifecycle.
//!
//! Ties the pipeline together:
//!
//! - [`RebalanceRunner`] turns categorized regular players into divisions,
//!   either through the DP partitioner or by keeping everyone in their
//!   virtual division;
//! - [`LeagueOrchestrator`] runs the season boundaries: closing a season
//!   into outcomes, preparing the next one (rookie divisions plus the
//!   regular rebalance, in one transaction) and starting it by generating
//!   schedules and handing games to a [`GameCreator`];
//! - [`DivisionOps`] covers manual maintenance between those steps.
//!
//! # References
//!
//! Promotion and relegation between tiered divisions: Noll (2002),
//! "The Economics of Promotion and Relegation in Sports Leagues",
//! Journal of Sports Economics 3(2)

mod config;
mod division_ops;
mod games;
mod orchestrator;
mod rebalance;

pub use config::{ChallengeRule, LeagueSettings, MatchSettings, PlacementStrategy, RebalanceConfig};
pub use division_ops::{DivisionOps, MergeResult};
pub use games::{GameCreator, GameRequest};
pub use orchestrator::{DivisionStandings, LeagueOrchestrator, PreparedSeason, SeasonStart};
pub use rebalance::{PreviousSeason, RebalanceResult, RebalanceRunner};
