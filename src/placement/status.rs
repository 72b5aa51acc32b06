//! Placement status from league history.

use std::collections::HashMap;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, Stage, StoreContext, Subject};
use crate::model::{PlacementStatus, PlayerRecord, SeasonHistoryEntry, Standing, StandingResult};
use crate::standings::{DivisionPosition, StandingsCalculator};
use crate::store::Store;

/// Longest absence, in seasons, that still counts as a short hiatus.
pub const SHORT_HIATUS_MAX: u32 = 3;

/// Derives a registrant's placement status and seasons away.
///
/// `last` is the most recent earlier season the player took part in.
/// No history means NEW. A gap of `1..=3` seasons is a short hiatus,
/// longer is a long hiatus. Consecutive players coming out of a rookie
/// division are GRADUATED; everyone else carries last season's outcome
/// forward, with champion and unset outcomes counting as a stay.
pub fn placement_status(
    last: Option<&SeasonHistoryEntry>,
    season_number: u32,
) -> (PlacementStatus, u32) {
    let Some(last) = last else {
        return (PlacementStatus::New, 0);
    };
    let seasons_away = season_number
        .saturating_sub(last.season_number)
        .saturating_sub(1);
    let status = match seasons_away {
        0 if last.was_rookie() => PlacementStatus::Graduated,
        0 => match last.outcome {
            StandingResult::Promoted => PlacementStatus::Promoted,
            StandingResult::Relegated => PlacementStatus::Relegated,
            StandingResult::Stayed | StandingResult::Champion | StandingResult::None => {
                PlacementStatus::Stayed
            }
        },
        n if n <= SHORT_HIATUS_MAX => PlacementStatus::ShortHiatusReturning,
        _ => PlacementStatus::LongHiatusReturning,
    };
    (status, seasons_away)
}

/// Reconciles a status with where the player actually ended up.
///
/// The virtual division is where the outcome said the player should go;
/// `final_division` is where the partitioner put them.
pub fn correct_status(
    status: PlacementStatus,
    virtual_division: u32,
    final_division: u32,
) -> PlacementStatus {
    use std::cmp::Ordering::*;
    match (status, final_division.cmp(&virtual_division)) {
        (PlacementStatus::Relegated, Less) => PlacementStatus::Stayed,
        (PlacementStatus::Promoted, Greater) => PlacementStatus::Relegated,
        (PlacementStatus::Stayed, Less) => PlacementStatus::Promoted,
        (PlacementStatus::Stayed, Greater) => PlacementStatus::Relegated,
        (s, _) => s,
    }
}

/// Computes and persists placement statuses for a season's records.
pub struct PlacementStatusUpdater;

impl PlacementStatusUpdater {
    /// Fills `status` and `seasons_away` on every record and writes them.
    ///
    /// Every write sets the full value, so re-running the batch after a
    /// partial failure converges to the same state.
    pub fn apply<S: Store>(
        store: &mut S,
        records: &mut [PlayerRecord],
        season_number: u32,
    ) -> Result<()> {
        Self::fill_live_outcomes(&*store, records, season_number)?;
        let mut hiatus = 0usize;
        for record in records.iter_mut() {
            let (status, seasons_away) = placement_status(record.last_season.as_ref(), season_number);
            record.status = status;
            record.seasons_away = seasons_away;

            let subject = Subject::Player(record.user_id);
            let rank = record.previous_rank();
            if status.is_hiatus() {
                hiatus += 1;
            }
            store
                .set_placement_status_with_hiatus(record.registration_id, status, rank, seasons_away)
                .at_subject(Stage::PlacementStatus, subject)?;
            debug!(
                user = %record.username,
                status = status.as_str(),
                seasons_away,
                "placement status"
            );
        }
        info!(
            season = season_number,
            players = records.len(),
            hiatus,
            "updated placement statuses"
        );
        Ok(())
    }

    /// Fills in outcome and rank for players coming straight out of a
    /// regular division whose season was never closed.
    ///
    /// The previous division's stored standings are sorted and marked with
    /// that season's promotion formula. Players without a standings row
    /// keep an unset outcome. Returns how many records were filled.
    pub fn fill_live_outcomes<S: Store>(
        store: &S,
        records: &mut [PlayerRecord],
        season_number: u32,
    ) -> Result<usize> {
        let mut marked: HashMap<(Uuid, u32), Vec<Standing>> = HashMap::new();
        let mut filled = 0;
        for record in records.iter_mut() {
            let Some(last) = record.last_season.as_mut() else {
                continue;
            };
            let Some(number) = last.division_number else {
                continue;
            };
            if last.outcome != StandingResult::None
                || last.was_rookie()
                || last.season_number + 1 != season_number
            {
                continue;
            }

            let key = (last.season_id, number);
            if !marked.contains_key(&key) {
                let table = Self::live_standings(store, last.season_id, number)?;
                marked.insert(key, table);
            }
            let Some(table) = marked.get(&key) else {
                continue;
            };
            let Some(idx) = table.iter().position(|s| s.user_id == record.user_id) else {
                continue;
            };
            last.outcome = table[idx].result;
            last.rank = Some(idx as u32 + 1);
            filled += 1;
            debug!(
                user = %record.username,
                rank = idx + 1,
                "outcome taken from live standings"
            );
        }
        if filled > 0 {
            info!(players = filled, "filled outcomes from unclosed season");
        }
        Ok(filled)
    }

    /// Sorted and marked standings of division `number` in `season_id`.
    fn live_standings<S: Store>(store: &S, season_id: Uuid, number: u32) -> Result<Vec<Standing>> {
        let subject = Subject::Season(season_id);
        let season = store.season(season_id).at_subject(Stage::PlacementStatus, subject)?;
        let divisions = store
            .divisions(season_id)
            .at_subject(Stage::PlacementStatus, subject)?;
        let Some(division) = divisions.iter().find(|d| d.number == number) else {
            return Ok(Vec::new());
        };
        let mut standings = store
            .standings(division.id)
            .at_subject(Stage::PlacementStatus, Subject::Division(division.id))?;
        StandingsCalculator::sort(&mut standings);
        let position = DivisionPosition::of(division, &divisions);
        StandingsCalculator::mark_outcomes(&mut standings, position, season.promotion_formula);
        Ok(standings)
    }

    /// Rewrites statuses that the final placement contradicts.
    ///
    /// Returns how many records changed.
    pub fn correct<S: Store>(store: &mut S, records: &mut [PlayerRecord]) -> Result<usize> {
        let mut changed = 0;
        for record in records.iter_mut() {
            let (Some(vd), Some(fd)) = (record.virtual_division, record.assigned_division) else {
                continue;
            };
            let corrected = correct_status(record.status, vd, fd);
            if corrected == record.status {
                continue;
            }
            info!(
                user = %record.username,
                virtual_division = vd,
                final_division = fd,
                old = record.status.as_str(),
                new = corrected.as_str(),
                "corrected placement status"
            );
            record.status = corrected;
            store
                .set_placement_status(record.registration_id, corrected, record.previous_rank())
                .at_subject(Stage::PlacementStatus, Subject::Player(record.user_id))?;
            changed += 1;
        }
        Ok(changed)
    }
}
