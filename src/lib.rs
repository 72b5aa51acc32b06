//! Ladder-league engine: division rebalancing and round-robin scheduling.
//!
//! A league runs in seasons. Between seasons every registrant is placed
//! into a numbered division (1 is the top), and within a season each
//! division plays a round robin. This crate provides:
//!
//! - **Registration**: signing players up and categorizing them as new or
//!   returning, with a single rating collapsed from per-variant ratings.
//! - **Placement**: placement statuses from history, virtual target
//!   divisions and a placement priority ordering.
//! - **Partition**: a dynamic-programming partitioner that sizes divisions
//!   around an ideal while keeping players near their targets.
//! - **Rookie**: separate divisions for a large enough cohort of new
//!   players, and their graduation into the regular ladder.
//! - **Standings**: win/loss/spread tables, ranking and promotion or
//!   relegation outcomes.
//! - **Pairing**: seeded circle-method schedules with balanced first-move
//!   counts, round caps and balanced subsets for large odd divisions.
//! - **Season**: the lifecycle orchestrator and manual division
//!   operations.
//!
//! # Architecture
//!
//! Persistence sits behind the [`store::Store`] trait so the engine can run
//! against any backend; [`store::MemoryStore`] is the in-memory reference
//! implementation with transactional rollback. Game creation is delegated
//! to a caller-supplied [`season::GameCreator`]. Every configuration struct
//! validates itself, and every fallible operation returns
//! [`LeagueError`].

pub mod error;
pub mod model;
pub mod pairing;
pub mod partition;
pub mod placement;
pub mod registration;
pub mod rookie;
pub mod season;
pub mod standings;
pub mod store;

pub use error::{LeagueError, Result};
