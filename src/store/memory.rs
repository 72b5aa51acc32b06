//! In-memory store with snapshot rollback.

use std::collections::{BTreeMap, HashMap, HashSet};

use uuid::Uuid;

use super::types::{Store, StoreError, StoreResult};
use crate::model::{
    Division, GameResult, PlacementStatus, Registration, Season, SeasonHistoryEntry, Standing,
    StandingResult, VariantRating,
};

#[derive(Debug, Clone, Default)]
struct State {
    seasons: BTreeMap<Uuid, Season>,
    divisions: BTreeMap<Uuid, Division>,
    registrations: BTreeMap<Uuid, Registration>,
    standings: BTreeMap<(Uuid, Uuid), Standing>,
    games: Vec<GameResult>,
    ratings: HashMap<Uuid, Vec<VariantRating>>,
}

/// A [`Store`] backed by ordered maps.
///
/// [`Store::transaction`] snapshots the whole state and restores it when
/// the closure fails. [`MemoryStore::fail_after_writes`] injects a backend
/// failure after a number of successful writes, to exercise that path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: State,
    write_budget: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write after the next `n` fail with a backend error.
    pub fn fail_after_writes(&mut self, n: usize) {
        self.write_budget = Some(n);
    }

    /// Removes an injected failure.
    pub fn clear_failure(&mut self) {
        self.write_budget = None;
    }

    /// Records a finished game.
    pub fn add_game(&mut self, game: GameResult) {
        self.state.games.push(game);
    }

    /// Sets a user's per-variant ratings.
    pub fn set_ratings(&mut self, user_id: Uuid, ratings: Vec<VariantRating>) {
        self.state.ratings.insert(user_id, ratings);
    }

    fn write(&mut self) -> StoreResult<()> {
        match self.write_budget.as_mut() {
            Some(0) => Err(StoreError::Backend("injected write failure".into())),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn registration_mut(&mut self, id: Uuid) -> StoreResult<&mut Registration> {
        self.state
            .registrations
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                kind: "registration",
                id,
            })
    }

    fn sorted_registrations<'a>(
        &self,
        iter: impl Iterator<Item = &'a Registration>,
    ) -> Vec<Registration> {
        let mut regs: Vec<Registration> = iter.cloned().collect();
        regs.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        regs
    }
}

impl Store for MemoryStore {
    fn create_season(&mut self, season: Season) -> StoreResult<()> {
        self.write()?;
        let clash = self
            .state
            .seasons
            .values()
            .any(|s| s.league_id == season.league_id && s.number == season.number);
        if clash {
            return Err(StoreError::Conflict(format!(
                "season {} already exists in league {}",
                season.number, season.league_id
            )));
        }
        self.state.seasons.insert(season.id, season);
        Ok(())
    }

    fn season(&self, id: Uuid) -> StoreResult<Season> {
        self.state
            .seasons
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "season", id })
    }

    fn season_by_number(&self, league_id: Uuid, number: u32) -> StoreResult<Option<Season>> {
        Ok(self
            .state
            .seasons
            .values()
            .find(|s| s.league_id == league_id && s.number == number)
            .cloned())
    }

    fn update_season(&mut self, season: &Season) -> StoreResult<()> {
        self.write()?;
        let slot = self
            .state
            .seasons
            .get_mut(&season.id)
            .ok_or(StoreError::NotFound {
                kind: "season",
                id: season.id,
            })?;
        *slot = season.clone();
        Ok(())
    }

    fn create_division(&mut self, division: Division) -> StoreResult<()> {
        self.write()?;
        let clash = self
            .state
            .divisions
            .values()
            .any(|d| d.season_id == division.season_id && d.number == division.number);
        if clash {
            return Err(StoreError::Conflict(format!(
                "division number {} already used in season {}",
                division.number, division.season_id
            )));
        }
        self.state.divisions.insert(division.id, division);
        Ok(())
    }

    fn division(&self, id: Uuid) -> StoreResult<Division> {
        self.state
            .divisions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: "division",
                id,
            })
    }

    fn divisions(&self, season_id: Uuid) -> StoreResult<Vec<Division>> {
        let mut divs: Vec<Division> = self
            .state
            .divisions
            .values()
            .filter(|d| d.season_id == season_id)
            .cloned()
            .collect();
        divs.sort_by_key(|d| d.number);
        Ok(divs)
    }

    fn update_division(&mut self, division: &Division) -> StoreResult<()> {
        self.write()?;
        let slot = self
            .state
            .divisions
            .get_mut(&division.id)
            .ok_or(StoreError::NotFound {
                kind: "division",
                id: division.id,
            })?;
        *slot = division.clone();
        Ok(())
    }

    fn delete_division(&mut self, id: Uuid) -> StoreResult<()> {
        self.write()?;
        if !self.state.divisions.contains_key(&id) {
            return Err(StoreError::NotFound {
                kind: "division",
                id,
            });
        }
        if self
            .state
            .registrations
            .values()
            .any(|r| r.division_id == Some(id))
        {
            return Err(StoreError::Conflict(format!(
                "division {id} still has registrations"
            )));
        }
        self.state.divisions.remove(&id);
        self.state.standings.retain(|(div, _), _| *div != id);
        Ok(())
    }

    fn renumber_divisions(
        &mut self,
        season_id: Uuid,
        numbering: &[(Uuid, u32)],
    ) -> StoreResult<()> {
        self.write()?;
        let mut next: HashMap<Uuid, u32> = self
            .state
            .divisions
            .values()
            .filter(|d| d.season_id == season_id)
            .map(|d| (d.id, d.number))
            .collect();
        for &(id, number) in numbering {
            match next.get_mut(&id) {
                Some(slot) => *slot = number,
                None => {
                    return Err(StoreError::NotFound {
                        kind: "division",
                        id,
                    })
                }
            }
        }
        let mut seen = HashSet::new();
        for number in next.values() {
            if !seen.insert(*number) {
                return Err(StoreError::Conflict(format!(
                    "renumbering produces duplicate division number {number}"
                )));
            }
        }
        for (id, number) in next {
            if let Some(div) = self.state.divisions.get_mut(&id) {
                if div.number != number && !div.is_rookie() {
                    div.name = format!("Division {number}");
                }
                div.number = number;
            }
        }
        Ok(())
    }

    fn create_registration(&mut self, registration: Registration) -> StoreResult<()> {
        self.write()?;
        let clash = self.state.registrations.values().any(|r| {
            r.season_id == registration.season_id && r.user_id == registration.user_id
        });
        if clash {
            return Err(StoreError::Conflict(format!(
                "user {} already registered for season {}",
                registration.user_id, registration.season_id
            )));
        }
        self.state
            .registrations
            .insert(registration.id, registration);
        Ok(())
    }

    fn registration(&self, id: Uuid) -> StoreResult<Registration> {
        self.state
            .registrations
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: "registration",
                id,
            })
    }

    fn registrations(&self, season_id: Uuid) -> StoreResult<Vec<Registration>> {
        Ok(self.sorted_registrations(
            self.state
                .registrations
                .values()
                .filter(|r| r.season_id == season_id),
        ))
    }

    fn division_registrations(&self, division_id: Uuid) -> StoreResult<Vec<Registration>> {
        Ok(self.sorted_registrations(
            self.state
                .registrations
                .values()
                .filter(|r| r.division_id == Some(division_id)),
        ))
    }

    fn set_registration_division(
        &mut self,
        id: Uuid,
        division_id: Option<Uuid>,
    ) -> StoreResult<()> {
        self.write()?;
        if let Some(div) = division_id {
            if !self.state.divisions.contains_key(&div) {
                return Err(StoreError::NotFound {
                    kind: "division",
                    id: div,
                });
            }
        }
        let reg = self.registration_mut(id)?;
        reg.division_id = division_id;
        reg.firsts_count = 0;
        Ok(())
    }

    fn set_registration_rating(&mut self, id: Uuid, rating: i32) -> StoreResult<()> {
        self.write()?;
        self.registration_mut(id)?.rating = rating;
        Ok(())
    }

    fn set_placement_status(
        &mut self,
        id: Uuid,
        status: PlacementStatus,
        previous_rank: Option<u32>,
    ) -> StoreResult<()> {
        self.write()?;
        let reg = self.registration_mut(id)?;
        reg.placement_status = status;
        reg.previous_division_rank = previous_rank;
        Ok(())
    }

    fn set_placement_status_with_hiatus(
        &mut self,
        id: Uuid,
        status: PlacementStatus,
        previous_rank: Option<u32>,
        seasons_away: u32,
    ) -> StoreResult<()> {
        self.write()?;
        let reg = self.registration_mut(id)?;
        reg.placement_status = status;
        reg.previous_division_rank = previous_rank;
        reg.seasons_away = seasons_away;
        Ok(())
    }

    fn set_season_outcome(
        &mut self,
        id: Uuid,
        outcome: StandingResult,
        rank: Option<u32>,
    ) -> StoreResult<()> {
        self.write()?;
        let reg = self.registration_mut(id)?;
        reg.outcome = outcome;
        reg.final_rank = rank;
        Ok(())
    }

    fn set_firsts_count(&mut self, id: Uuid, firsts: u32) -> StoreResult<()> {
        self.write()?;
        self.registration_mut(id)?.firsts_count = firsts;
        Ok(())
    }

    fn season_history(
        &self,
        league_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Vec<SeasonHistoryEntry>> {
        let mut history = Vec::new();
        for reg in self
            .state
            .registrations
            .values()
            .filter(|r| r.user_id == user_id)
        {
            let Some(season) = self.state.seasons.get(&reg.season_id) else {
                continue;
            };
            if season.league_id != league_id {
                continue;
            }
            let division = reg.division_id.and_then(|id| self.state.divisions.get(&id));
            let division_size = reg.division_id.map_or(0, |id| {
                self.state
                    .registrations
                    .values()
                    .filter(|r| r.division_id == Some(id))
                    .count()
            });
            history.push(SeasonHistoryEntry {
                season_id: season.id,
                season_number: season.number,
                division_number: division.map(|d| d.number),
                division_size,
                outcome: reg.outcome,
                rank: reg.final_rank,
            });
        }
        history.sort_by_key(|h| h.season_number);
        Ok(history)
    }

    fn ratings(&self, user_id: Uuid) -> StoreResult<Vec<VariantRating>> {
        Ok(self
            .state
            .ratings
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn standings(&self, division_id: Uuid) -> StoreResult<Vec<Standing>> {
        Ok(self
            .state
            .standings
            .range((division_id, Uuid::nil())..=(division_id, Uuid::from_u128(u128::MAX)))
            .map(|(_, s)| s.clone())
            .collect())
    }

    fn upsert_standing(&mut self, standing: Standing) -> StoreResult<()> {
        self.write()?;
        self.state
            .standings
            .insert((standing.division_id, standing.user_id), standing);
        Ok(())
    }

    fn games(&self, division_id: Uuid) -> StoreResult<Vec<GameResult>> {
        Ok(self
            .state
            .games
            .iter()
            .filter(|g| g.division_id == division_id)
            .cloned()
            .collect())
    }

    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.state.clone();
        let result = f(self);
        if result.is_err() {
            self.state = snapshot;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_renumber_applies_atomically() {
        let mut store = MemoryStore::new();
        let season = Uuid::new_v4();
        let a = Division::regular(season, 1);
        let b = Division::regular(season, 2);
        let (a_id, b_id) = (a.id, b.id);
        store.create_division(a).unwrap();
        store.create_division(b).unwrap();

        // A swap would collide if applied one pair at a time.
        store
            .renumber_divisions(season, &[(a_id, 2), (b_id, 1)])
            .unwrap();
        assert_eq!(store.division(a_id).unwrap().number, 2);
        assert_eq!(store.division(b_id).unwrap().number, 1);
        assert_eq!(store.division(a_id).unwrap().name, "Division 2");
    }

    #[test]
    fn test_renumber_rejects_collision() {
        let mut store = MemoryStore::new();
        let season = Uuid::new_v4();
        let a = Division::regular(season, 1);
        let b = Division::regular(season, 2);
        let a_id = a.id;
        store.create_division(a).unwrap();
        store.create_division(b).unwrap();

        assert!(store.renumber_divisions(season, &[(a_id, 2)]).is_err());
        assert_eq!(store.division(a_id).unwrap().number, 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let mut store = MemoryStore::new();
        let season = Uuid::new_v4();
        let result: Result<(), StoreError> = store.transaction(|s| {
            s.create_division(Division::regular(season, 1))?;
            Err(StoreError::Backend("boom".into()))
        });
        assert!(result.is_err());
        assert!(store.divisions(season).unwrap().is_empty());
    }

    #[test]
    fn test_injected_failure() {
        let mut store = MemoryStore::new();
        let season = Uuid::new_v4();
        store.fail_after_writes(1);
        assert!(store.create_division(Division::regular(season, 1)).is_ok());
        assert!(store.create_division(Division::regular(season, 2)).is_err());
        store.clear_failure();
        assert!(store.create_division(Division::regular(season, 2)).is_ok());
    }

    #[test]
    fn test_season_history_reports_division_and_size() {
        let mut store = MemoryStore::new();
        let league = Uuid::new_v4();
        let s1 = Season::new(league, 1);
        let s1_id = s1.id;
        store.create_season(s1).unwrap();
        let div = Division::regular(s1_id, 2);
        let div_id = div.id;
        store.create_division(div).unwrap();

        let user = Uuid::new_v4();
        let reg = Registration::new(s1_id, user, "alice", ts());
        let reg_id = reg.id;
        store.create_registration(reg).unwrap();
        let other = Registration::new(s1_id, Uuid::new_v4(), "bob", ts());
        let other_id = other.id;
        store.create_registration(other).unwrap();
        store.set_registration_division(reg_id, Some(div_id)).unwrap();
        store.set_registration_division(other_id, Some(div_id)).unwrap();
        store
            .set_season_outcome(reg_id, StandingResult::Promoted, Some(1))
            .unwrap();

        let history = store.season_history(league, user).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].division_number, Some(2));
        assert_eq!(history[0].division_size, 2);
        assert_eq!(history[0].outcome, StandingResult::Promoted);
        assert_eq!(history[0].rank, Some(1));
    }

    #[test]
    fn test_delete_division_with_players_conflicts() {
        let mut store = MemoryStore::new();
        let season = Uuid::new_v4();
        let div = Division::regular(season, 1);
        let div_id = div.id;
        store.create_division(div).unwrap();
        let reg = Registration::new(season, Uuid::new_v4(), "carol", ts());
        let reg_id = reg.id;
        store.create_registration(reg).unwrap();
        store.set_registration_division(reg_id, Some(div_id)).unwrap();

        assert!(matches!(
            store.delete_division(div_id),
            Err(StoreError::Conflict(_))
        ));
    }
}
