//! Registrant categorization.

use tracing::{debug, info};

use super::config::CategorizerConfig;
use crate::error::{LeagueError, Result, Stage, StoreContext, Subject};
use crate::model::{PlayerRecord, Season, VariantRating};
use crate::store::Store;

/// Classifies registrants and computes their ratings.
pub struct Categorizer;

impl Categorizer {
    /// Collapses per-variant ratings into one number.
    ///
    /// Averages the stable ratings; if none are stable, averages the
    /// unstable ones; with no ratings at all the result is 0. The average
    /// is truncated toward zero.
    pub fn rating(ratings: &[VariantRating], config: &CategorizerConfig) -> i32 {
        let (stable, unstable): (Vec<&VariantRating>, Vec<&VariantRating>) = ratings
            .iter()
            .partition(|r| r.deviation < config.stable_deviation);
        let pool = if stable.is_empty() { unstable } else { stable };
        if pool.is_empty() {
            return 0;
        }
        let sum: f64 = pool.iter().map(|r| r.rating).sum();
        (sum / pool.len() as f64) as i32
    }

    /// Builds one [`PlayerRecord`] per registration of `season`.
    ///
    /// A registrant is NEW when they have no registration in any earlier
    /// season of the league. For RETURNING players the record carries the
    /// most recent earlier season. Computed ratings are written back onto
    /// the registrations.
    pub fn categorize<S: Store>(
        store: &mut S,
        season: &Season,
        config: &CategorizerConfig,
    ) -> Result<Vec<PlayerRecord>> {
        config.validate().map_err(LeagueError::InvalidConfig)?;

        let registrations = store
            .registrations(season.id)
            .at_subject(Stage::Categorize, Subject::Season(season.id))?;

        let mut records = Vec::with_capacity(registrations.len());
        for reg in registrations {
            let history = store
                .season_history(season.league_id, reg.user_id)
                .at_subject(Stage::Categorize, Subject::Player(reg.user_id))?;
            let last_season = history
                .into_iter()
                .filter(|h| h.season_number < season.number)
                .max_by_key(|h| h.season_number);

            let ratings = store
                .ratings(reg.user_id)
                .at_subject(Stage::Categorize, Subject::Player(reg.user_id))?;
            let rating = Self::rating(&ratings, config);
            if rating != reg.rating {
                store
                    .set_registration_rating(reg.id, rating)
                    .at_subject(Stage::Categorize, Subject::Player(reg.user_id))?;
            }

            debug!(
                user = %reg.username,
                rating,
                returning = last_season.is_some(),
                "categorized registrant"
            );
            records.push(PlayerRecord::new(
                reg.id,
                reg.user_id,
                reg.username,
                rating,
                last_season,
            ));
        }

        let new_count = records.iter().filter(|r| r.is_new()).count();
        info!(
            season = season.number,
            players = records.len(),
            new = new_count,
            "categorized season registrants"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Division, PlayerCategory, Registration};
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn vr(rating: f64, deviation: f64) -> VariantRating {
        VariantRating {
            variant: "classic".into(),
            rating,
            deviation,
        }
    }

    #[test]
    fn test_rating_prefers_stable() {
        let config = CategorizerConfig::default();
        let ratings = vec![vr(1800.0, 60.0), vr(1600.0, 80.0), vr(2200.0, 150.0)];
        assert_eq!(Categorizer::rating(&ratings, &config), 1700);
    }

    #[test]
    fn test_rating_falls_back_to_unstable() {
        let config = CategorizerConfig::default();
        let ratings = vec![vr(1501.0, 200.0), vr(1600.0, 120.0)];
        // (1501 + 1600) / 2 = 1550.5, truncated
        assert_eq!(Categorizer::rating(&ratings, &config), 1550);
    }

    #[test]
    fn test_rating_absent_is_zero() {
        let config = CategorizerConfig::default();
        assert_eq!(Categorizer::rating(&[], &config), 0);
    }

    #[test]
    fn test_deviation_at_threshold_is_unstable() {
        let config = CategorizerConfig::default();
        let ratings = vec![vr(1000.0, 90.0), vr(2000.0, 89.9)];
        assert_eq!(Categorizer::rating(&ratings, &config), 2000);
    }

    #[test]
    fn test_categorize_new_and_returning() {
        let mut store = MemoryStore::new();
        let league = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let s1 = Season::new(league, 1);
        let s2 = Season::new(league, 2);
        store.create_season(s1.clone()).unwrap();
        store.create_season(s2.clone()).unwrap();
        let div = Division::regular(s1.id, 1);
        let div_id = div.id;
        store.create_division(div).unwrap();

        let veteran = Uuid::new_v4();
        let old = Registration::new(s1.id, veteran, "veteran", at);
        let old_id = old.id;
        store.create_registration(old).unwrap();
        store.set_registration_division(old_id, Some(div_id)).unwrap();

        store
            .create_registration(Registration::new(s2.id, veteran, "veteran", at))
            .unwrap();
        let rookie = Uuid::new_v4();
        store
            .create_registration(Registration::new(s2.id, rookie, "rookie", at))
            .unwrap();
        store.set_ratings(rookie, vec![vr(1450.0, 50.0)]);

        let records =
            Categorizer::categorize(&mut store, &s2, &CategorizerConfig::default()).unwrap();
        assert_eq!(records.len(), 2);

        let v = records.iter().find(|r| r.user_id == veteran).unwrap();
        assert_eq!(v.category, PlayerCategory::Returning);
        assert_eq!(v.previous_division(), Some(1));
        assert_eq!(v.rating, 0);

        let r = records.iter().find(|r| r.user_id == rookie).unwrap();
        assert_eq!(r.category, PlayerCategory::New);
        assert_eq!(r.rating, 1450);
        let stored = store.registration(r.registration_id).unwrap();
        assert_eq!(stored.rating, 1450);
    }

    #[test]
    fn test_first_season_everyone_is_new() {
        let mut store = MemoryStore::new();
        let season = Season::new(Uuid::new_v4(), 1);
        store.create_season(season.clone()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        for name in ["a", "b", "c"] {
            store
                .create_registration(Registration::new(season.id, Uuid::new_v4(), name, at))
                .unwrap();
        }
        let records =
            Categorizer::categorize(&mut store, &season, &CategorizerConfig::default()).unwrap();
        assert!(records.iter().all(|r| r.is_new()));
    }
}
