//! Regular-ladder rebalance.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::config::{PlacementStrategy, RebalanceConfig};
use crate::error::{LeagueError, Result, Stage, StoreContext, Subject};
use crate::model::{Division, PlayerRecord, Season};
use crate::partition::{PartitionPlayer, PartitionSolver};
use crate::placement::{PlacementRunner, PlacementStatusUpdater};
use crate::rookie::graduation_targets;
use crate::standings::StandingsCalculator;
use crate::store::Store;

/// What the previous season contributes to placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviousSeason {
    /// Regular divisions the previous season had.
    pub regular_divisions: u32,
    /// Graduating rookies to their target division.
    pub graduation: HashMap<Uuid, u32>,
}

impl PreviousSeason {
    /// Loads the season numbered just before `season`.
    ///
    /// A league's first season, or a gap in numbering, yields an empty
    /// context and everyone is placed as if the ladder were new.
    pub fn load<S: Store>(store: &S, season: &Season, graduation_divisor: usize) -> Result<Self> {
        if season.number <= 1 {
            return Ok(Self::default());
        }
        let Some(previous) = store
            .season_by_number(season.league_id, season.number - 1)
            .at_subject(Stage::VirtualDivision, Subject::Season(season.id))?
        else {
            return Ok(Self::default());
        };

        let divisions = store
            .divisions(previous.id)
            .at_subject(Stage::VirtualDivision, Subject::Season(previous.id))?;
        let regular_divisions = divisions.iter().filter(|d| !d.is_rookie()).count() as u32;

        // One cohort across all rookie divisions, by final rank, then by
        // division number.
        let mut pooled: Vec<(usize, u32, Uuid)> = Vec::new();
        for div in divisions.iter().filter(|d| d.is_rookie()) {
            let ranked = Self::rookie_ranking(store, div)?;
            pooled.extend(ranked.into_iter().enumerate().map(|(rank, id)| (rank, div.number, id)));
        }
        pooled.sort_by_key(|&(rank, number, _)| (rank, number));
        let cohort: Vec<Uuid> = pooled.into_iter().map(|(_, _, id)| id).collect();
        let graduation: HashMap<Uuid, u32> =
            graduation_targets(&cohort, regular_divisions, graduation_divisor)
                .into_iter()
                .collect();

        Ok(Self {
            regular_divisions,
            graduation,
        })
    }

    /// Final order of a rookie division: stored standings first, then any
    /// registrant without a standings row by username.
    fn rookie_ranking<S: Store>(store: &S, division: &Division) -> Result<Vec<Uuid>> {
        let subject = Subject::Division(division.id);
        let mut standings = store
            .standings(division.id)
            .at_subject(Stage::VirtualDivision, subject)?;
        StandingsCalculator::sort(&mut standings);
        let mut ranked: Vec<Uuid> = standings.iter().map(|s| s.user_id).collect();

        let mut unranked: Vec<(String, Uuid)> = store
            .division_registrations(division.id)
            .at_subject(Stage::VirtualDivision, subject)?
            .into_iter()
            .filter(|r| !ranked.contains(&r.user_id))
            .map(|r| (r.username, r.user_id))
            .collect();
        unranked.sort();
        ranked.extend(unranked.into_iter().map(|(_, id)| id));
        Ok(ranked)
    }
}

/// Outcome of [`RebalanceRunner::rebalance`].
#[derive(Debug, Clone)]
pub struct RebalanceResult {
    /// Created regular divisions, by number.
    pub divisions: Vec<Division>,
    /// Partitioner cost; `None` for direct placement.
    pub total_cost: Option<f64>,
    /// Whether an undersized last division was folded into the one above.
    pub merged: bool,
    /// Statuses rewritten to match the final placement.
    pub corrected: usize,
    /// Whether the partitioner stopped early.
    pub cancelled: bool,
}

impl RebalanceResult {
    fn empty() -> Self {
        Self {
            divisions: Vec::new(),
            total_cost: None,
            merged: false,
            corrected: 0,
            cancelled: false,
        }
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.divisions.iter().map(|d| d.player_count).collect()
    }

    pub fn players(&self) -> usize {
        self.divisions.iter().map(|d| d.player_count).sum()
    }
}

/// Places a season's regular players into freshly created divisions.
pub struct RebalanceRunner;

impl RebalanceRunner {
    /// Runs the rebalance for `records`, which must already carry their
    /// placement status and exclude anyone routed to rookie divisions.
    ///
    /// The season's existing regular divisions are emptied and deleted
    /// first, so a retry after a failure converges on the same layout.
    /// Callers wanting all-or-nothing semantics run this inside
    /// [`Store::transaction`].
    pub fn rebalance<S: Store>(
        store: &mut S,
        season: &Season,
        records: &mut [PlayerRecord],
        previous: &PreviousSeason,
        config: &RebalanceConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RebalanceResult> {
        config.validate().map_err(LeagueError::InvalidConfig)?;
        Self::clear_regular_divisions(store, season.id)?;

        if records.is_empty() {
            info!(season = season.number, "no regular players to place");
            return Ok(RebalanceResult::empty());
        }

        PlacementRunner::prepare(
            records,
            previous.regular_divisions,
            &previous.graduation,
            &config.priority,
        )?;

        let mut result = RebalanceResult::empty();
        let mut k = match config.strategy {
            PlacementStrategy::Direct => PlacementRunner::place_direct(records),
            PlacementStrategy::Partition => {
                let players: Vec<PartitionPlayer> =
                    records.iter().map(PartitionPlayer::from).collect();
                let solution = PartitionSolver::solve_with_cancel(&players, &config.partition, cancel)?;
                if solution.cancelled {
                    warn!(season = season.number, "partition cancelled, using best layout found");
                }
                for record in records.iter_mut() {
                    record.assigned_division = solution.assignments.get(&record.user_id).copied();
                }
                result.total_cost = Some(solution.total_cost);
                result.cancelled = solution.cancelled;
                solution.k() as u32
            }
        };

        if Self::merge_undersized_last(records, k, config.merge_below) {
            k -= 1;
            result.merged = true;
        }

        result.divisions = Self::write_divisions(store, season.id, records, k)?;
        result.corrected = PlacementStatusUpdater::correct(store, records)?;

        info!(
            season = season.number,
            players = records.len(),
            divisions = result.divisions.len(),
            sizes = ?result.sizes(),
            cost = ?result.total_cost,
            merged = result.merged,
            corrected = result.corrected,
            "rebalanced regular divisions"
        );
        Ok(result)
    }

    fn clear_regular_divisions<S: Store>(store: &mut S, season_id: Uuid) -> Result<()> {
        let existing = store
            .divisions(season_id)
            .at_subject(Stage::DivisionWrite, Subject::Season(season_id))?;
        for div in existing.into_iter().filter(|d| !d.is_rookie()) {
            let subject = Subject::Division(div.id);
            for reg in store
                .division_registrations(div.id)
                .at_subject(Stage::DivisionWrite, subject)?
            {
                store
                    .set_registration_division(reg.id, None)
                    .at_subject(Stage::DivisionWrite, Subject::Player(reg.user_id))?;
            }
            store
                .delete_division(div.id)
                .at_subject(Stage::DivisionWrite, subject)?;
        }
        Ok(())
    }

    /// Moves the last division's players up a division when it is too
    /// small. Returns whether it did.
    fn merge_undersized_last(records: &mut [PlayerRecord], k: u32, merge_below: usize) -> bool {
        if k <= 1 {
            return false;
        }
        let last = records
            .iter()
            .filter(|r| r.assigned_division == Some(k))
            .count();
        if last >= merge_below {
            return false;
        }
        warn!(
            division = k,
            players = last,
            threshold = merge_below,
            "merging undersized final division"
        );
        for record in records.iter_mut().filter(|r| r.assigned_division == Some(k)) {
            record.assigned_division = Some(k - 1);
        }
        true
    }

    /// Creates divisions `1..=k` and assigns every record to its division.
    fn write_divisions<S: Store>(
        store: &mut S,
        season_id: Uuid,
        records: &[PlayerRecord],
        k: u32,
    ) -> Result<Vec<Division>> {
        let mut divisions = Vec::with_capacity(k as usize);
        for number in 1..=k {
            let mut division = Division::regular(season_id, number);
            division.player_count = records
                .iter()
                .filter(|r| r.assigned_division == Some(number))
                .count();
            store
                .create_division(division.clone())
                .at_subject(Stage::DivisionWrite, Subject::Division(division.id))?;
            divisions.push(division);
        }

        for record in records {
            let Some(number) = record.assigned_division else {
                return Err(LeagueError::NoFeasiblePartition {
                    players: records.len(),
                });
            };
            let Some(division) = divisions.get((number as usize).wrapping_sub(1)) else {
                return Err(LeagueError::NoFeasiblePartition {
                    players: records.len(),
                });
            };
            store
                .set_registration_division(record.registration_id, Some(division.id))
                .at_subject(Stage::DivisionWrite, Subject::Player(record.user_id))?;
        }
        Ok(divisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        PlacementStatus, Registration, SeasonHistoryEntry, StandingResult, ROOKIE_DIVISION_BASE,
    };
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn history(number: u32, division: u32, size: usize, rank: u32) -> SeasonHistoryEntry {
        SeasonHistoryEntry {
            season_id: Uuid::new_v4(),
            season_number: number,
            division_number: Some(division),
            division_size: size,
            outcome: StandingResult::Stayed,
            rank: Some(rank),
        }
    }

    type Entry = (String, Option<SeasonHistoryEntry>, PlacementStatus);

    /// A season with one registration per entry, statuses already set.
    fn setup(records: &[Entry]) -> (MemoryStore, Season, Vec<PlayerRecord>) {
        let mut store = MemoryStore::new();
        let season = Season::new(Uuid::new_v4(), 2);
        store.create_season(season.clone()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut out = Vec::new();
        for (name, last, status) in records {
            let reg = Registration::new(season.id, Uuid::new_v4(), name.clone(), at);
            store.create_registration(reg.clone()).unwrap();
            let mut rec = PlayerRecord::new(reg.id, reg.user_id, name.clone(), 1500, last.clone());
            rec.status = *status;
            out.push(rec);
        }
        (store, season, out)
    }

    fn stayed(n: usize, division: u32) -> Vec<Entry> {
        (0..n)
            .map(|i| {
                (
                    format!("d{division}p{i:02}"),
                    Some(history(1, division, n, i as u32 + 1)),
                    PlacementStatus::Stayed,
                )
            })
            .collect()
    }

    #[test]
    fn test_perfect_layout_keeps_divisions() {
        let mut layout = stayed(15, 1);
        layout.extend(stayed(15, 2));
        let (mut store, season, mut records) = setup(&layout);
        let previous = PreviousSeason {
            regular_divisions: 2,
            graduation: HashMap::new(),
        };
        let result = RebalanceRunner::rebalance(
            &mut store,
            &season,
            &mut records,
            &previous,
            &RebalanceConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(result.sizes(), vec![15, 15]);
        assert!(result.total_cost.is_some_and(|c| c.abs() < 1e-10));
        assert_eq!(result.corrected, 0);
        for r in &records {
            assert_eq!(r.assigned_division, r.virtual_division, "{}", r.username);
        }
        let placed = store
            .registrations(season.id)
            .unwrap()
            .iter()
            .filter(|r| r.division_id.is_some())
            .count();
        assert_eq!(placed, 30);
    }

    #[test]
    fn test_rerun_replaces_divisions() {
        let layout = stayed(12, 1);
        let (mut store, season, mut records) = setup(&layout);
        let previous = PreviousSeason {
            regular_divisions: 1,
            graduation: HashMap::new(),
        };
        let config = RebalanceConfig::default();
        RebalanceRunner::rebalance(&mut store, &season, &mut records, &previous, &config, None)
            .unwrap();
        let first = store.divisions(season.id).unwrap();
        RebalanceRunner::rebalance(&mut store, &season, &mut records, &previous, &config, None)
            .unwrap();
        let second = store.divisions(season.id).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0].id, second[0].id);
        assert_eq!(second[0].player_count, 12);
    }

    #[test]
    fn test_direct_placement_merges_small_tail() {
        let mut layout = stayed(12, 1);
        layout.extend(stayed(3, 2));
        let (mut store, season, mut records) = setup(&layout);
        let previous = PreviousSeason {
            regular_divisions: 2,
            graduation: HashMap::new(),
        };
        let config = RebalanceConfig::default().with_strategy(PlacementStrategy::Direct);
        let result =
            RebalanceRunner::rebalance(&mut store, &season, &mut records, &previous, &config, None)
                .unwrap();
        assert!(result.merged);
        assert_eq!(result.sizes(), vec![15]);
        assert!(result.total_cost.is_none());
        // The three pulled up from division 2 now count as promoted.
        assert_eq!(result.corrected, 3);
        let promoted = store
            .registrations(season.id)
            .unwrap()
            .iter()
            .filter(|r| r.placement_status == PlacementStatus::Promoted)
            .count();
        assert_eq!(promoted, 3);
    }

    #[test]
    fn test_empty_records_clear_divisions() {
        let (mut store, season, mut records) = setup(&[]);
        store.create_division(Division::regular(season.id, 1)).unwrap();
        let result = RebalanceRunner::rebalance(
            &mut store,
            &season,
            &mut records,
            &PreviousSeason::default(),
            &RebalanceConfig::default(),
            None,
        )
        .unwrap();
        assert!(result.divisions.is_empty());
        assert!(store.divisions(season.id).unwrap().is_empty());
    }

    #[test]
    fn test_rookie_divisions_survive_rebalance() {
        let layout = stayed(10, 1);
        let (mut store, season, mut records) = setup(&layout);
        let rookie = Division::rookie(season.id, 1);
        store.create_division(rookie.clone()).unwrap();
        RebalanceRunner::rebalance(
            &mut store,
            &season,
            &mut records,
            &PreviousSeason::default(),
            &RebalanceConfig::default(),
            None,
        )
        .unwrap();
        let numbers: Vec<u32> = store
            .divisions(season.id)
            .unwrap()
            .iter()
            .map(|d| d.number)
            .collect();
        assert_eq!(numbers, vec![1, ROOKIE_DIVISION_BASE]);
    }

    #[test]
    fn test_previous_season_graduation_targets() {
        let mut store = MemoryStore::new();
        let league = Uuid::new_v4();
        let prev = Season::new(league, 1);
        let next = Season::new(league, 2);
        store.create_season(prev.clone()).unwrap();
        store.create_season(next.clone()).unwrap();
        for n in 1..=3 {
            store.create_division(Division::regular(prev.id, n)).unwrap();
        }
        let rookie = Division::rookie(prev.id, 1);
        store.create_division(rookie.clone()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut users = Vec::new();
        for i in 0..12 {
            let reg = Registration::new(prev.id, Uuid::new_v4(), format!("r{i:02}"), at);
            store.create_registration(reg.clone()).unwrap();
            store.set_registration_division(reg.id, Some(rookie.id)).unwrap();
            users.push(reg.user_id);
        }

        let loaded = PreviousSeason::load(&store, &next, 6).unwrap();
        assert_eq!(loaded.regular_divisions, 3);
        assert_eq!(loaded.graduation.len(), 12);
        // Six groups of two, targets 2, 3, 3, 3, 3, 3 in username order.
        assert_eq!(loaded.graduation[&users[0]], 2);
        assert_eq!(loaded.graduation[&users[1]], 2);
        assert_eq!(loaded.graduation[&users[11]], 3);
    }

    #[test]
    fn test_graduation_pools_rookie_divisions() {
        let mut store = MemoryStore::new();
        let league = Uuid::new_v4();
        let prev = Season::new(league, 1);
        let next = Season::new(league, 2);
        store.create_season(prev.clone()).unwrap();
        store.create_season(next.clone()).unwrap();
        for n in 1..=8 {
            store.create_division(Division::regular(prev.id, n)).unwrap();
        }
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut cohorts: Vec<Vec<Uuid>> = Vec::new();
        for (ordinal, prefix, size) in [(1, "a", 14), (2, "b", 10)] {
            let rookie = Division::rookie(prev.id, ordinal);
            store.create_division(rookie.clone()).unwrap();
            let mut users = Vec::new();
            for i in 0..size {
                let reg = Registration::new(prev.id, Uuid::new_v4(), format!("{prefix}{i:02}"), at);
                store.create_registration(reg.clone()).unwrap();
                store.set_registration_division(reg.id, Some(rookie.id)).unwrap();
                users.push(reg.user_id);
            }
            cohorts.push(users);
        }

        let loaded = PreviousSeason::load(&store, &next, 6).unwrap();
        assert_eq!(loaded.graduation.len(), 24);
        // 24 rookies: six groups of four starting at division 8 - 6 + 1.
        // Rank-1 rookies of both divisions share the first group.
        assert_eq!(loaded.graduation[&cohorts[0][0]], 3);
        assert_eq!(loaded.graduation[&cohorts[1][0]], 3);
        assert_eq!(loaded.graduation[&cohorts[0][2]], 4);
        assert_eq!(loaded.graduation[&cohorts[1][9]], 7);
        assert_eq!(loaded.graduation[&cohorts[0][13]], 8);
    }

    #[test]
    fn test_first_season_has_no_previous() {
        let store = MemoryStore::new();
        let season = Season::new(Uuid::new_v4(), 1);
        assert_eq!(
            PreviousSeason::load(&store, &season, 6).unwrap(),
            PreviousSeason::default()
        );
    }
}
