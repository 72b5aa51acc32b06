//! Rookie division planning and creation.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use super::config::RookieConfig;
use super::sizing::rookie_division_sizes;
use crate::error::{LeagueError, Result, Stage, StoreContext, Subject};
use crate::model::{Division, PlayerRecord};
use crate::store::Store;

/// One planned rookie division.
#[derive(Debug, Clone, PartialEq)]
pub struct RookiePlan {
    /// 1-based position among the season's rookie divisions.
    pub ordinal: u32,
    /// Registration ids, strongest rating first.
    pub registrations: Vec<Uuid>,
}

/// Builds rookie divisions for a large NEW cohort.
pub struct RookieBuilder;

impl RookieBuilder {
    /// Whether `new_players` rookies are enough for rookie divisions.
    pub fn qualifies(new_players: usize, config: &RookieConfig) -> bool {
        new_players >= config.min_rookies
    }

    /// Splits rookies, sorted by rating (highest first, then username),
    /// into consecutive blocks of [`rookie_division_sizes`].
    pub fn plan(rookies: &[&PlayerRecord], config: &RookieConfig) -> Vec<RookiePlan> {
        let mut sorted: Vec<&PlayerRecord> = rookies.to_vec();
        sorted.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| a.username.cmp(&b.username))
        });
        let mut start = 0;
        rookie_division_sizes(sorted.len(), config)
            .into_iter()
            .enumerate()
            .map(|(i, size)| {
                let members = &sorted[start..start + size];
                start += size;
                RookiePlan {
                    ordinal: i as u32 + 1,
                    registrations: members.iter().map(|r| r.registration_id).collect(),
                }
            })
            .collect()
    }

    /// Replaces the season's rookie divisions with ones built from `rookies`.
    ///
    /// Existing rookie divisions of the season are emptied and deleted
    /// first, so repeating the call yields the same layout. Sets
    /// `assigned_division` on every placed record.
    pub fn create<S: Store>(
        store: &mut S,
        season_id: Uuid,
        rookies: &mut [PlayerRecord],
        config: &RookieConfig,
    ) -> Result<Vec<Division>> {
        config.validate().map_err(LeagueError::InvalidConfig)?;
        let subject = Subject::Season(season_id);

        for div in store
            .divisions(season_id)
            .at_subject(Stage::Rookie, subject)?
            .into_iter()
            .filter(|d| d.is_rookie())
        {
            for reg in store
                .division_registrations(div.id)
                .at_subject(Stage::Rookie, Subject::Division(div.id))?
            {
                store
                    .set_registration_division(reg.id, None)
                    .at_subject(Stage::Rookie, Subject::Player(reg.user_id))?;
            }
            store
                .delete_division(div.id)
                .at_subject(Stage::Rookie, Subject::Division(div.id))?;
        }

        let plans = {
            let refs: Vec<&PlayerRecord> = rookies.iter().collect();
            Self::plan(&refs, config)
        };

        let index: HashMap<Uuid, usize> = rookies
            .iter()
            .enumerate()
            .map(|(i, r)| (r.registration_id, i))
            .collect();
        let mut created = Vec::with_capacity(plans.len());
        for plan in &plans {
            let mut division = Division::rookie(season_id, plan.ordinal);
            division.player_count = plan.registrations.len();
            store
                .create_division(division.clone())
                .at_subject(Stage::Rookie, Subject::Division(division.id))?;
            for &reg_id in &plan.registrations {
                store
                    .set_registration_division(reg_id, Some(division.id))
                    .at_subject(Stage::Rookie, Subject::Player(reg_id))?;
                if let Some(&i) = index.get(&reg_id) {
                    rookies[i].assigned_division = Some(division.number);
                }
            }
            created.push(division);
        }

        info!(
            season = %season_id,
            rookies = rookies.len(),
            divisions = created.len(),
            "created rookie divisions"
        );
        Ok(created)
    }
}
