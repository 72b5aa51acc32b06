//! League data model.
//!
//! Persistent entities ([`Season`], [`Division`], [`Registration`],
//! [`Standing`]), their status enums, the per-player pipeline record
//! [`PlayerRecord`] carried through a rebalance, and the injected
//! [`Clock`].

mod clock;
mod entities;
mod record;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entities::{
    Division, GameResult, GameWinner, Registration, Season, SeasonHistoryEntry, Standing,
    VariantRating, ROOKIE_DIVISION_BASE,
};
pub use record::{PlayerCategory, PlayerRecord};
pub use types::{PlacementStatus, PromotionFormula, SeasonStatus, StandingResult};
