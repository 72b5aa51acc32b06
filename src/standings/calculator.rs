//! Standings tally, ranking and outcome marking.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, Stage, StoreContext, Subject};
use crate::model::{
    Division, GameResult, GameWinner, PromotionFormula, Standing, StandingResult,
};
use crate::store::Store;

/// Where a division sits on the ladder, which decides who can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionPosition {
    pub is_highest: bool,
    pub is_lowest: bool,
    pub is_rookie: bool,
}

impl DivisionPosition {
    /// Locates `division` among all divisions of its season.
    pub fn of(division: &Division, season_divisions: &[Division]) -> Self {
        if division.is_rookie() {
            return Self {
                is_highest: false,
                is_lowest: true,
                is_rookie: true,
            };
        }
        let regular = season_divisions.iter().filter(|d| !d.is_rookie());
        let lowest = regular.clone().map(|d| d.number).max().unwrap_or(division.number);
        let highest = regular.map(|d| d.number).min().unwrap_or(division.number);
        Self {
            is_highest: division.number == highest,
            is_lowest: division.number == lowest,
            is_rookie: false,
        }
    }
}

/// Computes standings for one division.
pub struct StandingsCalculator;

impl StandingsCalculator {
    /// Tallies `games` for the listed players and returns sorted standings.
    ///
    /// Games involving anyone outside `roster` are skipped.
    pub fn tally(
        division_id: Uuid,
        roster: &[(Uuid, String)],
        games: &[GameResult],
    ) -> Vec<Standing> {
        let mut standings: Vec<Standing> = roster
            .iter()
            .map(|(id, name)| Standing::new(division_id, *id, name.clone()))
            .collect();
        for game in games {
            if !Self::apply_game(&mut standings, game) {
                warn!(
                    division = %division_id,
                    "skipping game with a player outside the division"
                );
            }
        }
        Self::sort(&mut standings);
        standings
    }

    /// Adds one finished game to both players' standings.
    ///
    /// Returns `false` and changes nothing if either player is missing.
    pub fn apply_game(standings: &mut [Standing], game: &GameResult) -> bool {
        let first = standings.iter().position(|s| s.user_id == game.players[0]);
        let second = standings.iter().position(|s| s.user_id == game.players[1]);
        let (Some(a), Some(b)) = (first, second) else {
            return false;
        };
        if a == b {
            return false;
        }
        let margin = game.scores[0] - game.scores[1];
        for (idx, side) in [(a, 0usize), (b, 1usize)] {
            let s = &mut standings[idx];
            s.games_played += 1;
            s.spread += if side == 0 { margin } else { -margin };
            match (game.winner, side) {
                (GameWinner::Tie, _) => s.draws += 1,
                (GameWinner::First, 0) | (GameWinner::Second, 1) => s.wins += 1,
                _ => s.losses += 1,
            }
        }
        true
    }

    /// Sorts by points, then spread (both descending), then username.
    pub fn sort(standings: &mut [Standing]) {
        standings.sort_by(Self::compare);
    }

    fn compare(a: &Standing, b: &Standing) -> Ordering {
        b.points()
            .cmp(&a.points())
            .then_with(|| b.spread.cmp(&a.spread))
            .then_with(|| a.username.cmp(&b.username))
    }

    /// 1-based rank of `user_id`, derived by sorting a copy.
    pub fn rank_of(standings: &[Standing], user_id: Uuid) -> Option<u32> {
        let mut sorted: Vec<&Standing> = standings.iter().collect();
        sorted.sort_by(|a, b| Self::compare(a, b));
        sorted
            .iter()
            .position(|s| s.user_id == user_id)
            .map(|p| p as u32 + 1)
    }

    /// Marks outcomes on standings that are already sorted.
    ///
    /// The top `count` ranks are promoted unless this is the highest
    /// division, where rank 1 is champion. The bottom `count` ranks are
    /// relegated unless this is the lowest or a rookie division. Promotion
    /// wins when the two ranges overlap.
    pub fn mark_outcomes(
        standings: &mut [Standing],
        position: DivisionPosition,
        formula: PromotionFormula,
    ) {
        let size = standings.len();
        let count = formula.count(size);
        let can_relegate = !position.is_lowest && !position.is_rookie;
        for (idx, s) in standings.iter_mut().enumerate() {
            let rank = idx + 1;
            s.result = if rank <= count && !position.is_highest {
                StandingResult::Promoted
            } else if rank > size.saturating_sub(count) && can_relegate {
                StandingResult::Relegated
            } else if rank == 1 && position.is_highest {
                StandingResult::Champion
            } else {
                StandingResult::Stayed
            };
        }
    }

    /// Recomputes a division's standings from its finished games and
    /// upserts them. Re-running against the same games gives the same rows.
    pub fn recalculate<S: Store>(
        store: &mut S,
        division: &Division,
        position: DivisionPosition,
        formula: PromotionFormula,
    ) -> Result<Vec<Standing>> {
        let subject = Subject::Division(division.id);
        let roster: Vec<(Uuid, String)> = store
            .division_registrations(division.id)
            .at_subject(Stage::Standings, subject)?
            .into_iter()
            .map(|r| (r.user_id, r.username))
            .collect();
        let games = store
            .games(division.id)
            .at_subject(Stage::Standings, subject)?;

        let mut standings = Self::tally(division.id, &roster, &games);
        Self::mark_outcomes(&mut standings, position, formula);
        for s in &standings {
            store
                .upsert_standing(s.clone())
                .at_subject(Stage::Standings, Subject::Player(s.user_id))?;
        }
        debug!(
            division = division.number,
            players = standings.len(),
            games = games.len(),
            "recalculated standings"
        );
        Ok(standings)
    }

    /// Applies one finished game to the stored standings of its division.
    ///
    /// Players without a stored row start from zero.
    pub fn record_game<S: Store>(store: &mut S, game: &GameResult) -> Result<()> {
        let subject = Subject::Division(game.division_id);
        let existing: HashMap<Uuid, Standing> = store
            .standings(game.division_id)
            .at_subject(Stage::Standings, subject)?
            .into_iter()
            .map(|s| (s.user_id, s))
            .collect();

        let mut pair = Vec::with_capacity(2);
        for user in game.players {
            let standing = match existing.get(&user) {
                Some(s) => s.clone(),
                None => {
                    let reg = store
                        .division_registrations(game.division_id)
                        .at_subject(Stage::Standings, subject)?
                        .into_iter()
                        .find(|r| r.user_id == user);
                    let name = reg.map(|r| r.username).unwrap_or_default();
                    Standing::new(game.division_id, user, name)
                }
            };
            pair.push(standing);
        }

        if Self::apply_game(&mut pair, game) {
            for s in pair {
                store
                    .upsert_standing(s)
                    .at_subject(Stage::Standings, subject)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Registration, Season};
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn roster(names: &[&str]) -> Vec<(Uuid, String)> {
        names
            .iter()
            .map(|n| (Uuid::new_v4(), n.to_string()))
            .collect()
    }

    fn game(div: Uuid, a: Uuid, b: Uuid, sa: i32, sb: i32) -> GameResult {
        GameResult::from_scores(div, [a, b], [sa, sb])
    }

    fn middle() -> DivisionPosition {
        DivisionPosition {
            is_highest: false,
            is_lowest: false,
            is_rookie: false,
        }
    }

    fn count(standings: &[Standing], result: StandingResult) -> usize {
        standings.iter().filter(|s| s.result == result).count()
    }

    #[test]
    fn test_tally_wins_losses_draws_spread() {
        let div = Uuid::new_v4();
        let r = roster(&["ann", "ben", "cat"]);
        let games = vec![
            game(div, r[0].0, r[1].0, 450, 400),
            game(div, r[1].0, r[2].0, 380, 380),
            game(div, r[2].0, r[0].0, 500, 300),
        ];
        let s = StandingsCalculator::tally(div, &r, &games);

        let ann = s.iter().find(|x| x.username == "ann").unwrap();
        assert_eq!((ann.wins, ann.losses, ann.draws), (1, 1, 0));
        assert_eq!(ann.spread, 50 - 200);
        assert_eq!(ann.games_played, 2);

        let cat = s.iter().find(|x| x.username == "cat").unwrap();
        assert_eq!((cat.wins, cat.losses, cat.draws), (1, 0, 1));
        assert_eq!(cat.spread, 200);
        // cat: 3 points, ann: 2 points spread -150, ben: 1 point
        assert_eq!(s[0].username, "cat");
        assert_eq!(s[1].username, "ann");
        assert_eq!(s[2].username, "ben");
    }

    #[test]
    fn test_sort_tiebreaks_spread_then_username() {
        let div = Uuid::new_v4();
        let mut s: Vec<Standing> = ["zed", "amy", "kim"]
            .iter()
            .map(|n| {
                let mut st = Standing::new(div, Uuid::new_v4(), *n);
                st.wins = 3;
                st
            })
            .collect();
        s[2].spread = 10;
        StandingsCalculator::sort(&mut s);
        assert_eq!(s[0].username, "kim");
        assert_eq!(s[1].username, "amy");
        assert_eq!(s[2].username, "zed");
    }

    #[test]
    fn test_middle_division_promotes_and_relegates_equally() {
        let div = Uuid::new_v4();
        for size in [7usize, 12, 13, 15, 18] {
            let mut s: Vec<Standing> = (0..size)
                .map(|i| Standing::new(div, Uuid::new_v4(), format!("p{i:02}")))
                .collect();
            StandingsCalculator::mark_outcomes(&mut s, middle(), PromotionFormula::CeilNOver6);
            let expected = size.div_ceil(6);
            assert_eq!(count(&s, StandingResult::Promoted), expected, "size {size}");
            assert_eq!(count(&s, StandingResult::Relegated), expected, "size {size}");
        }
    }

    #[test]
    fn test_top_division_never_promotes() {
        let div = Uuid::new_v4();
        let mut s: Vec<Standing> = (0..15)
            .map(|i| Standing::new(div, Uuid::new_v4(), format!("p{i:02}")))
            .collect();
        let pos = DivisionPosition {
            is_highest: true,
            is_lowest: false,
            is_rookie: false,
        };
        StandingsCalculator::mark_outcomes(&mut s, pos, PromotionFormula::CeilNOver6);
        assert_eq!(count(&s, StandingResult::Promoted), 0);
        assert_eq!(s[0].result, StandingResult::Champion);
        assert_eq!(count(&s, StandingResult::Relegated), 3);
    }

    #[test]
    fn test_lowest_and_rookie_never_relegate() {
        let div = Uuid::new_v4();
        for pos in [
            DivisionPosition {
                is_highest: false,
                is_lowest: true,
                is_rookie: false,
            },
            DivisionPosition {
                is_highest: false,
                is_lowest: true,
                is_rookie: true,
            },
        ] {
            let mut s: Vec<Standing> = (0..14)
                .map(|i| Standing::new(div, Uuid::new_v4(), format!("p{i:02}")))
                .collect();
            StandingsCalculator::mark_outcomes(&mut s, pos, PromotionFormula::CeilNOver6);
            assert_eq!(count(&s, StandingResult::Relegated), 0);
            assert_eq!(count(&s, StandingResult::Promoted), 3);
        }
    }

    #[test]
    fn test_single_division_league_only_stays() {
        let div = Uuid::new_v4();
        let mut s: Vec<Standing> = (0..10)
            .map(|i| Standing::new(div, Uuid::new_v4(), format!("p{i:02}")))
            .collect();
        let pos = DivisionPosition {
            is_highest: true,
            is_lowest: true,
            is_rookie: false,
        };
        StandingsCalculator::mark_outcomes(&mut s, pos, PromotionFormula::CeilNOver6);
        assert_eq!(s[0].result, StandingResult::Champion);
        assert_eq!(count(&s, StandingResult::Stayed), 9);
    }

    #[test]
    fn test_position_of_divisions() {
        let season = Uuid::new_v4();
        let divs = vec![
            Division::regular(season, 1),
            Division::regular(season, 2),
            Division::regular(season, 3),
            Division::rookie(season, 1),
        ];
        assert!(DivisionPosition::of(&divs[0], &divs).is_highest);
        assert!(!DivisionPosition::of(&divs[1], &divs).is_highest);
        assert!(!DivisionPosition::of(&divs[1], &divs).is_lowest);
        assert!(DivisionPosition::of(&divs[2], &divs).is_lowest);
        assert!(DivisionPosition::of(&divs[3], &divs).is_rookie);
    }

    #[test]
    fn test_rank_of() {
        let div = Uuid::new_v4();
        let r = roster(&["a", "b"]);
        let s = StandingsCalculator::tally(div, &r, &[game(div, r[1].0, r[0].0, 400, 300)]);
        assert_eq!(StandingsCalculator::rank_of(&s, r[1].0), Some(1));
        assert_eq!(StandingsCalculator::rank_of(&s, r[0].0), Some(2));
        assert_eq!(StandingsCalculator::rank_of(&s, Uuid::new_v4()), None);
    }

    fn seeded_division() -> (MemoryStore, Division, Vec<Uuid>) {
        let mut store = MemoryStore::new();
        let season = Season::new(Uuid::new_v4(), 1);
        store.create_season(season.clone()).unwrap();
        let div = Division::regular(season.id, 1);
        store.create_division(div.clone()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut users = Vec::new();
        for name in ["ann", "ben", "cat", "dan"] {
            let user = Uuid::new_v4();
            let reg = Registration::new(season.id, user, name, at);
            let reg_id = reg.id;
            store.create_registration(reg).unwrap();
            store.set_registration_division(reg_id, Some(div.id)).unwrap();
            users.push(user);
        }
        (store, div, users)
    }

    #[test]
    fn test_recalculate_is_idempotent() {
        let (mut store, div, u) = seeded_division();
        store.add_game(game(div.id, u[0], u[1], 420, 390));
        store.add_game(game(div.id, u[2], u[3], 300, 310));
        store.add_game(game(div.id, u[0], u[3], 350, 350));

        let pos = DivisionPosition {
            is_highest: true,
            is_lowest: true,
            is_rookie: false,
        };
        let first =
            StandingsCalculator::recalculate(&mut store, &div, pos, PromotionFormula::CeilNOver6)
                .unwrap();
        let second =
            StandingsCalculator::recalculate(&mut store, &div, pos, PromotionFormula::CeilNOver6)
                .unwrap();
        assert_eq!(first, second);

        let mut stored = store.standings(div.id).unwrap();
        StandingsCalculator::sort(&mut stored);
        assert_eq!(stored, first);
    }

    #[test]
    fn test_record_game_matches_recalculation() {
        let (mut store, div, u) = seeded_division();
        let games = vec![
            game(div.id, u[0], u[1], 420, 390),
            game(div.id, u[1], u[2], 300, 300),
            game(div.id, u[3], u[0], 500, 410),
        ];
        for g in &games {
            StandingsCalculator::record_game(&mut store, g).unwrap();
        }
        let mut incremental = store.standings(div.id).unwrap();
        StandingsCalculator::sort(&mut incremental);

        let roster: Vec<(Uuid, String)> = store
            .division_registrations(div.id)
            .unwrap()
            .into_iter()
            .map(|r| (r.user_id, r.username))
            .collect();
        let full = StandingsCalculator::tally(div.id, &roster, &games);
        assert_eq!(incremental, full);
    }
}
