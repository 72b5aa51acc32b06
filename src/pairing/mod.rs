//! Round-robin pairing.
//!
//! Generates a division's match schedule with the circle method: one player
//! stays fixed while the rest rotate a seat per round, and a phantom bye
//! fills odd fields. Seating is shuffled from a seed so schedules are
//! reproducible per division without repeating across divisions.
//!
//! Who moves first is balanced three ways:
//!
//! - complete schedules use a phase rule on the player-index sum, which
//!   evens out firsts over the full round robin;
//! - capped schedules assign firsts greedily to whoever has fewer so far,
//!   with a seeded tiebreak;
//! - large odd fields drop games down to a fixed per-player target before
//!   the greedy pass.
//!
//! # References
//!
//! Circle method: Kirkman (1847); Dinitz, Froncek, Lamken & Wallis (2006),
//! "Scheduling a tournament", Handbook of Combinatorial Designs

mod circle;
mod config;
mod runner;
mod seed;
mod types;

pub use circle::{round_opponents, seeded_order};
pub use config::PairingConfig;
pub use runner::PairingRunner;
pub use seed::{first_player_tiebreak, pairing_seed};
pub use types::{GamePairing, Schedule};
