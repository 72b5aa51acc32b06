//! Season lifecycle: close, prepare and start.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::config::{LeagueSettings, RebalanceConfig};
use super::games::{GameCreator, GameRequest};
use super::rebalance::{PreviousSeason, RebalanceResult, RebalanceRunner};
use crate::error::{LeagueError, Result, Stage, StoreContext, Subject};
use crate::model::{
    Clock, Division, PlayerRecord, Registration, Season, SeasonStatus, Standing, SystemClock,
};
use crate::pairing::{pairing_seed, PairingRunner, Schedule};
use crate::placement::PlacementStatusUpdater;
use crate::registration::Categorizer;
use crate::rookie::RookieBuilder;
use crate::standings::{DivisionPosition, StandingsCalculator};
use crate::store::Store;

/// Final standings of one division.
#[derive(Debug, Clone)]
pub struct DivisionStandings {
    pub division: Division,
    /// Sorted, rank 1 first.
    pub standings: Vec<Standing>,
}

/// Outcome of [`LeagueOrchestrator::prepare_next_season`].
#[derive(Debug, Clone)]
pub struct PreparedSeason {
    pub season_id: Uuid,
    pub regular: RebalanceResult,
    pub rookie_divisions: Vec<Division>,
    /// Registrants with no earlier season in the league.
    pub new_players: usize,
    /// Every registrant's pipeline record, in placement order.
    pub records: Vec<PlayerRecord>,
}

impl PreparedSeason {
    pub fn division_count(&self) -> usize {
        self.regular.divisions.len() + self.rookie_divisions.len()
    }

    pub fn players_placed(&self) -> usize {
        self.regular.players() + self.rookie_divisions.iter().map(|d| d.player_count).sum::<usize>()
    }
}

/// Outcome of [`LeagueOrchestrator::start_season`].
#[derive(Debug, Clone, Default)]
pub struct SeasonStart {
    pub games_created: usize,
    pub games_per_division: HashMap<Uuid, usize>,
}

/// Drives a league through its season boundaries.
///
/// # Usage
///
/// ```no_run
/// use u_ladder::season::{LeagueOrchestrator, LeagueSettings, RebalanceConfig};
/// use u_ladder::store::MemoryStore;
/// # use uuid::Uuid;
/// # let season_id = Uuid::new_v4();
///
/// let orchestrator =
///     LeagueOrchestrator::new(LeagueSettings::default(), RebalanceConfig::default()).unwrap();
/// let mut store = MemoryStore::new();
/// let prepared = orchestrator.prepare_next_season(&mut store, season_id, None).unwrap();
/// println!("{} divisions", prepared.division_count());
/// ```
pub struct LeagueOrchestrator {
    settings: LeagueSettings,
    config: RebalanceConfig,
    clock: Arc<dyn Clock>,
}

impl LeagueOrchestrator {
    /// Validates `settings` and `config` together.
    ///
    /// The league's ideal division size overrides the partitioner's.
    pub fn new(settings: LeagueSettings, mut config: RebalanceConfig) -> Result<Self> {
        settings.validate().map_err(LeagueError::InvalidConfig)?;
        config.partition = config
            .partition
            .with_ideal_size(settings.ideal_division_size);
        config.validate().map_err(LeagueError::InvalidConfig)?;
        Ok(Self {
            settings,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &LeagueSettings {
        &self.settings
    }

    pub fn config(&self) -> &RebalanceConfig {
        &self.config
    }

    /// Creates season `number` of `league_id`, open for registration and
    /// using the league's promotion formula.
    pub fn open_season<S: Store>(&self, store: &mut S, league_id: Uuid, number: u32) -> Result<Season> {
        let season =
            Season::new(league_id, number).with_promotion_formula(self.settings.promotion_formula);
        store
            .create_season(season.clone())
            .at_subject(Stage::Registration, Subject::Season(season.id))?;
        info!(league = %league_id, season = number, "opened season");
        Ok(season)
    }

    /// Computes final standings and writes every player's outcome and rank
    /// onto their registration.
    ///
    /// Runs in one transaction. Closing a completed season again recomputes
    /// the same standings.
    pub fn close_season<S: Store>(&self, store: &mut S, season_id: Uuid) -> Result<Vec<DivisionStandings>> {
        let now = self.clock.now();
        store.transaction(|store| -> Result<Vec<DivisionStandings>> {
            let subject = Subject::Season(season_id);
            let mut season = store.season(season_id).at_subject(Stage::SeasonClose, subject)?;
            if !matches!(season.status, SeasonStatus::Active | SeasonStatus::Completed) {
                return Err(LeagueError::InvalidOperation(format!(
                    "season {} is {:?}, not active",
                    season.number, season.status
                )));
            }

            let divisions = store.divisions(season.id).at_subject(Stage::SeasonClose, subject)?;
            if divisions.is_empty() {
                return Err(LeagueError::InvalidOperation(format!(
                    "cannot close season {}: no divisions exist",
                    season.number
                )));
            }
            let mut closed = Vec::with_capacity(divisions.len());
            for division in &divisions {
                let position = DivisionPosition::of(division, &divisions);
                let standings =
                    StandingsCalculator::recalculate(store, division, position, season.promotion_formula)?;

                let registrations: HashMap<Uuid, Uuid> = store
                    .division_registrations(division.id)
                    .at_subject(Stage::SeasonClose, Subject::Division(division.id))?
                    .into_iter()
                    .map(|r| (r.user_id, r.id))
                    .collect();
                for (idx, standing) in standings.iter().enumerate() {
                    let Some(&reg_id) = registrations.get(&standing.user_id) else {
                        continue;
                    };
                    store
                        .set_season_outcome(reg_id, standing.result, Some(idx as u32 + 1))
                        .at_subject(Stage::SeasonClose, Subject::Player(standing.user_id))?;
                }

                let mut done = division.clone();
                done.complete = true;
                done.player_count = standings.len();
                store
                    .update_division(&done)
                    .at_subject(Stage::SeasonClose, Subject::Division(done.id))?;
                closed.push(DivisionStandings {
                    division: done,
                    standings,
                });
            }

            season.status = SeasonStatus::Completed;
            season.end_date = Some(now);
            store.update_season(&season).at_subject(Stage::SeasonClose, subject)?;
            info!(
                season = season.number,
                divisions = closed.len(),
                "closed season"
            );
            Ok(closed)
        })
    }

    /// Places a season's registrants into divisions.
    ///
    /// A NEW cohort large enough for rookie divisions gets them; everyone
    /// else goes through the regular rebalance. The whole step runs in one
    /// store transaction, so a failure leaves the season as it was and the
    /// call can be retried. Re-running on a scheduled season rebuilds its
    /// divisions.
    pub fn prepare_next_season<S: Store>(
        &self,
        store: &mut S,
        season_id: Uuid,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<PreparedSeason> {
        store.transaction(|store| -> Result<PreparedSeason> {
            let subject = Subject::Season(season_id);
            let mut season = store.season(season_id).at_subject(Stage::Categorize, subject)?;
            if !matches!(
                season.status,
                SeasonStatus::RegistrationOpen | SeasonStatus::Scheduled
            ) {
                return Err(LeagueError::InvalidOperation(format!(
                    "season {} is {:?} and can no longer be rebalanced",
                    season.number, season.status
                )));
            }
            let registered = store
                .registrations(season.id)
                .at_subject(Stage::Categorize, subject)?
                .len();
            if registered < self.config.min_players {
                return Err(LeagueError::InvalidOperation(format!(
                    "season {} has {registered} registrations, at least {} are needed",
                    season.number, self.config.min_players
                )));
            }
            info!(season = season.number, players = registered, "preparing season");

            let mut records = Categorizer::categorize(store, &season, &self.config.categorizer)?;
            PlacementStatusUpdater::apply(store, &mut records, season.number)?;

            let new_players = records.iter().filter(|r| r.status.is_new()).count();
            let rookie_route = RookieBuilder::qualifies(new_players, &self.config.rookie);
            let (mut rookies, mut regular): (Vec<PlayerRecord>, Vec<PlayerRecord>) = records
                .into_iter()
                .partition(|r| rookie_route && r.status.is_new());

            let rookie_divisions =
                RookieBuilder::create(store, season.id, &mut rookies, &self.config.rookie)?;
            let previous =
                PreviousSeason::load(store, &season, self.config.rookie.graduation_divisor)?;
            let result = RebalanceRunner::rebalance(
                store,
                &season,
                &mut regular,
                &previous,
                &self.config,
                cancel,
            )?;

            season.status = SeasonStatus::Scheduled;
            store.update_season(&season).at_subject(Stage::DivisionWrite, subject)?;

            let mut all = regular;
            all.extend(rookies);
            let prepared = PreparedSeason {
                season_id,
                regular: result,
                rookie_divisions,
                new_players,
                records: all,
            };
            info!(
                season = season.number,
                divisions = prepared.division_count(),
                placed = prepared.players_placed(),
                rookie_divisions = prepared.rookie_divisions.len(),
                "season prepared"
            );
            Ok(prepared)
        })
    }

    /// Generates every division's schedule and hands the games to `creator`.
    ///
    /// Divisions with fewer than two players are skipped. Firsts counts are
    /// written onto registrations before any game is created. A division
    /// whose games fail does not stop the others; if any failed the call
    /// returns [`LeagueError::GameCreation`] and the season stays scheduled.
    ///
    /// This step is not transactional. Firsts counts are already written and
    /// games already handed to `creator` are not withdrawn, so a retry after
    /// a failure creates every division's games again, including those of
    /// divisions that succeeded the first time. Callers that retry should
    /// discard the earlier games on the game service first.
    pub fn start_season<S: Store, G: GameCreator>(
        &self,
        store: &mut S,
        season_id: Uuid,
        creator: &mut G,
    ) -> Result<SeasonStart> {
        let subject = Subject::Season(season_id);
        let mut season = store.season(season_id).at_subject(Stage::SeasonStart, subject)?;
        if season.status != SeasonStatus::Scheduled {
            return Err(LeagueError::InvalidOperation(format!(
                "season {} is {:?}, not scheduled",
                season.number, season.status
            )));
        }

        let mut rosters: Vec<(Division, Vec<Registration>)> = Vec::new();
        for division in store.divisions(season.id).at_subject(Stage::SeasonStart, subject)? {
            let players = store
                .division_registrations(division.id)
                .at_subject(Stage::SeasonStart, Subject::Division(division.id))?;
            if players.len() < 2 {
                warn!(
                    division = division.number,
                    players = players.len(),
                    "skipping division with too few players"
                );
                continue;
            }
            rosters.push((division, players));
        }

        let requests: Vec<(usize, u64)> = rosters
            .iter()
            .map(|(d, players)| (players.len(), pairing_seed(season.id, d.id)))
            .collect();
        let schedules = PairingRunner::generate_many(&requests, &self.config.pairing)?;

        let mut start = SeasonStart::default();
        let mut failures = Vec::new();
        for ((division, players), schedule) in rosters.iter().zip(&schedules) {
            for (reg, firsts) in players.iter().zip(schedule.firsts_counts()) {
                store
                    .set_firsts_count(reg.id, firsts)
                    .at_subject(Stage::SeasonStart, Subject::Player(reg.user_id))?;
            }
            match self.create_games(creator, &season, division, players, schedule) {
                Ok(games) => {
                    info!(
                        division = division.number,
                        players = players.len(),
                        rounds = schedule.rounds,
                        games,
                        "created division games"
                    );
                    start.games_per_division.insert(division.id, games);
                    start.games_created += games;
                }
                Err(message) => {
                    error!(division = division.number, error = %message, "game creation failed");
                    failures.push(format!("division {}: {message}", division.number));
                }
            }
        }
        if !failures.is_empty() {
            return Err(LeagueError::GameCreation(failures.join("; ")));
        }

        season.status = SeasonStatus::Active;
        season.start_date = Some(self.clock.now());
        store.update_season(&season).at_subject(Stage::SeasonStart, subject)?;
        info!(
            season = season.number,
            games = start.games_created,
            "season started"
        );
        Ok(start)
    }

    fn create_games<G: GameCreator>(
        &self,
        creator: &mut G,
        season: &Season,
        division: &Division,
        players: &[Registration],
        schedule: &Schedule,
    ) -> std::result::Result<usize, String> {
        let mut created = 0;
        for pairing in &schedule.pairings {
            let (first, second) = pairing.order();
            let request = GameRequest::new(
                season.id,
                division.id,
                [players[first].user_id, players[second].user_id],
                pairing.round,
                &self.settings.match_settings,
            );
            let game_id = creator
                .instantiate_new_game(&request)
                .map_err(|e| format!("creating game {} of {}: {e}", created + 1, schedule.pairings.len()))?;
            creator
                .start_game(game_id)
                .map_err(|e| format!("starting game {game_id}: {e}"))?;
            created += 1;
        }
        Ok(created)
    }
}
