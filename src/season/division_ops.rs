//! Manual division maintenance.
//!
//! Renumbering is always computed as one permutation and handed to
//! [`Store::renumber_divisions`] in a single call. Rookie divisions keep
//! their numbers. Each operation runs in one [`Store::transaction`], so a
//! failed write leaves numbering and counts as they were.

use tracing::info;
use uuid::Uuid;

use crate::error::{LeagueError, Result, Stage, StoreContext, Subject};
use crate::model::{Division, ROOKIE_DIVISION_BASE};
use crate::store::Store;

/// Outcome of [`DivisionOps::merge_divisions`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub players_moved: usize,
    /// `(division id, new number)` for every division that moved.
    pub renumbered: Vec<(Uuid, u32)>,
}

/// Move, merge and insert operations on a season's divisions.
pub struct DivisionOps;

impl DivisionOps {
    /// Numbering that closes gaps among `divisions`' regular divisions.
    ///
    /// Only divisions whose number changes are listed.
    pub fn renumber_plan(divisions: &[Division]) -> Vec<(Uuid, u32)> {
        let mut regular: Vec<&Division> = divisions.iter().filter(|d| !d.is_rookie()).collect();
        regular.sort_by_key(|d| d.number);
        regular
            .iter()
            .enumerate()
            .filter_map(|(i, d)| {
                let number = i as u32 + 1;
                (d.number != number).then_some((d.id, number))
            })
            .collect()
    }

    /// Moves one registration into `to_division`.
    pub fn move_player<S: Store>(store: &mut S, registration_id: Uuid, to_division: Uuid) -> Result<()> {
        store.transaction(|store| Self::move_in(store, registration_id, to_division))
    }

    fn move_in<S: Store>(store: &mut S, registration_id: Uuid, to_division: Uuid) -> Result<()> {
        let reg = store
            .registration(registration_id)
            .at_subject(Stage::DivisionWrite, Subject::Player(registration_id))?;
        if reg.division_id == Some(to_division) {
            return Err(LeagueError::InvalidOperation(format!(
                "{} is already in that division",
                reg.username
            )));
        }
        let mut target = store
            .division(to_division)
            .at_subject(Stage::DivisionWrite, Subject::Division(to_division))?;
        if target.season_id != reg.season_id {
            return Err(LeagueError::InvalidOperation(
                "target division belongs to another season".into(),
            ));
        }
        if target.is_rookie() {
            return Err(LeagueError::InvalidOperation(
                "players cannot be moved into a rookie division".into(),
            ));
        }

        store
            .set_registration_division(reg.id, Some(target.id))
            .at_subject(Stage::DivisionWrite, Subject::Player(reg.user_id))?;

        if let Some(from) = reg.division_id {
            let mut source = store
                .division(from)
                .at_subject(Stage::DivisionWrite, Subject::Division(from))?;
            source.player_count = source.player_count.saturating_sub(1);
            store
                .update_division(&source)
                .at_subject(Stage::DivisionWrite, Subject::Division(from))?;
        }
        target.player_count += 1;
        store
            .update_division(&target)
            .at_subject(Stage::DivisionWrite, Subject::Division(target.id))?;

        info!(user = %reg.username, division = target.number, "moved player");
        Ok(())
    }

    /// Moves every player of `source` into `receiving`, deletes `source`
    /// and closes the numbering gap.
    pub fn merge_divisions<S: Store>(store: &mut S, receiving: Uuid, source: Uuid) -> Result<MergeResult> {
        store.transaction(|store| Self::merge_in(store, receiving, source))
    }

    fn merge_in<S: Store>(store: &mut S, receiving: Uuid, source: Uuid) -> Result<MergeResult> {
        if receiving == source {
            return Err(LeagueError::InvalidOperation(
                "cannot merge a division into itself".into(),
            ));
        }
        let mut into = store
            .division(receiving)
            .at_subject(Stage::DivisionWrite, Subject::Division(receiving))?;
        let from = store
            .division(source)
            .at_subject(Stage::DivisionWrite, Subject::Division(source))?;
        if into.season_id != from.season_id {
            return Err(LeagueError::InvalidOperation(
                "divisions belong to different seasons".into(),
            ));
        }
        if into.is_rookie() || from.is_rookie() {
            return Err(LeagueError::InvalidOperation(
                "rookie divisions cannot be merged".into(),
            ));
        }

        let players = store
            .division_registrations(source)
            .at_subject(Stage::DivisionWrite, Subject::Division(source))?;
        for reg in &players {
            store
                .set_registration_division(reg.id, Some(receiving))
                .at_subject(Stage::DivisionWrite, Subject::Player(reg.user_id))?;
        }
        into.player_count += players.len();
        store
            .update_division(&into)
            .at_subject(Stage::DivisionWrite, Subject::Division(receiving))?;
        store
            .delete_division(source)
            .at_subject(Stage::DivisionWrite, Subject::Division(source))?;

        let remaining = store
            .divisions(into.season_id)
            .at_subject(Stage::DivisionWrite, Subject::Season(into.season_id))?;
        let renumbered = Self::renumber_plan(&remaining);
        if !renumbered.is_empty() {
            store
                .renumber_divisions(into.season_id, &renumbered)
                .at_subject(Stage::DivisionWrite, Subject::Season(into.season_id))?;
        }

        info!(
            receiving = into.number,
            merged = from.number,
            players = players.len(),
            renumbered = renumbered.len(),
            "merged divisions"
        );
        Ok(MergeResult {
            players_moved: players.len(),
            renumbered,
        })
    }

    /// Creates an empty regular division at `number`, shifting that
    /// division and every one below it down by one.
    ///
    /// `number` may be at most one past the current lowest division.
    pub fn insert_division<S: Store>(
        store: &mut S,
        season_id: Uuid,
        number: u32,
        name: Option<&str>,
    ) -> Result<Division> {
        store.transaction(|store| Self::insert_in(store, season_id, number, name))
    }

    fn insert_in<S: Store>(
        store: &mut S,
        season_id: Uuid,
        number: u32,
        name: Option<&str>,
    ) -> Result<Division> {
        let existing = store
            .divisions(season_id)
            .at_subject(Stage::DivisionWrite, Subject::Season(season_id))?;
        let regular_count = existing.iter().filter(|d| !d.is_rookie()).count() as u32;
        if number < 1 || number > regular_count + 1 || number >= ROOKIE_DIVISION_BASE {
            return Err(LeagueError::InvalidOperation(format!(
                "division number {number} outside 1..={}",
                regular_count + 1
            )));
        }

        let shift: Vec<(Uuid, u32)> = existing
            .iter()
            .filter(|d| !d.is_rookie() && d.number >= number)
            .map(|d| (d.id, d.number + 1))
            .collect();
        if !shift.is_empty() {
            store
                .renumber_divisions(season_id, &shift)
                .at_subject(Stage::DivisionWrite, Subject::Season(season_id))?;
        }

        let mut division = Division::regular(season_id, number);
        if let Some(name) = name {
            division.name = name.to_string();
        }
        store
            .create_division(division.clone())
            .at_subject(Stage::DivisionWrite, Subject::Division(division.id))?;
        info!(division = number, shifted = shift.len(), "inserted division");
        Ok(division)
    }
}
