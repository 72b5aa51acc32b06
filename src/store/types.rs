//! The store trait.

use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    Division, GameResult, PlacementStatus, Registration, Season, SeasonHistoryEntry, Standing,
    StandingResult, VariantRating,
};

/// Result of a store call.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure reported by a store backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Synchronous league persistence.
///
/// Division listings are ordered by division number. Registration listings
/// are ordered by registration time, then username.
///
/// # Transactions
///
/// [`Store::transaction`] runs a closure as one unit of work. The default
/// implementation simply calls the closure; backends that can roll back
/// should override it so a failed rebalance leaves no partial writes.
pub trait Store {
    fn create_season(&mut self, season: Season) -> StoreResult<()>;
    fn season(&self, id: Uuid) -> StoreResult<Season>;
    fn season_by_number(&self, league_id: Uuid, number: u32) -> StoreResult<Option<Season>>;
    /// Persists status and date changes.
    fn update_season(&mut self, season: &Season) -> StoreResult<()>;

    fn create_division(&mut self, division: Division) -> StoreResult<()>;
    fn division(&self, id: Uuid) -> StoreResult<Division>;
    fn divisions(&self, season_id: Uuid) -> StoreResult<Vec<Division>>;
    fn update_division(&mut self, division: &Division) -> StoreResult<()>;
    fn delete_division(&mut self, id: Uuid) -> StoreResult<()>;
    /// Applies a complete renumbering of a season's divisions at once.
    ///
    /// Every `(division id, new number)` pair is applied together; the
    /// resulting numbers must not collide with each other or with divisions
    /// left out of `numbering`. Renumbered regular divisions are renamed
    /// `Division {n}`.
    fn renumber_divisions(&mut self, season_id: Uuid, numbering: &[(Uuid, u32)])
        -> StoreResult<()>;

    fn create_registration(&mut self, registration: Registration) -> StoreResult<()>;
    fn registration(&self, id: Uuid) -> StoreResult<Registration>;
    fn registrations(&self, season_id: Uuid) -> StoreResult<Vec<Registration>>;
    fn division_registrations(&self, division_id: Uuid) -> StoreResult<Vec<Registration>>;
    /// Places (or unplaces) a registration. Resets its firsts count.
    fn set_registration_division(&mut self, id: Uuid, division_id: Option<Uuid>)
        -> StoreResult<()>;
    fn set_registration_rating(&mut self, id: Uuid, rating: i32) -> StoreResult<()>;
    fn set_placement_status(
        &mut self,
        id: Uuid,
        status: PlacementStatus,
        previous_rank: Option<u32>,
    ) -> StoreResult<()>;
    fn set_placement_status_with_hiatus(
        &mut self,
        id: Uuid,
        status: PlacementStatus,
        previous_rank: Option<u32>,
        seasons_away: u32,
    ) -> StoreResult<()>;
    /// Records the end-of-season outcome on a registration.
    fn set_season_outcome(
        &mut self,
        id: Uuid,
        outcome: StandingResult,
        rank: Option<u32>,
    ) -> StoreResult<()>;
    fn set_firsts_count(&mut self, id: Uuid, firsts: u32) -> StoreResult<()>;

    /// Every season of `league_id` the user registered for, oldest first.
    fn season_history(&self, league_id: Uuid, user_id: Uuid)
        -> StoreResult<Vec<SeasonHistoryEntry>>;
    fn ratings(&self, user_id: Uuid) -> StoreResult<Vec<VariantRating>>;

    fn standings(&self, division_id: Uuid) -> StoreResult<Vec<Standing>>;
    fn upsert_standing(&mut self, standing: Standing) -> StoreResult<()>;
    /// Finished games of a division.
    fn games(&self, division_id: Uuid) -> StoreResult<Vec<GameResult>>;

    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        f(self)
    }
}
