//! Registration during the open window.

use tracing::info;
use uuid::Uuid;

use crate::error::{LeagueError, Result, Stage, StoreContext, Subject};
use crate::model::{Clock, Registration, SeasonStatus};
use crate::store::Store;

/// Registers a user for a season, stamped with the clock's current time.
///
/// Fails unless the season is open for registration.
pub fn register_player<S: Store>(
    store: &mut S,
    season_id: Uuid,
    user_id: Uuid,
    username: &str,
    clock: &dyn Clock,
) -> Result<Registration> {
    let season = store
        .season(season_id)
        .at_subject(Stage::Registration, Subject::Season(season_id))?;
    if season.status != SeasonStatus::RegistrationOpen {
        return Err(LeagueError::InvalidOperation(format!(
            "season {} is not open for registration",
            season.number
        )));
    }

    let registration = Registration::new(season_id, user_id, username, clock.now());
    store
        .create_registration(registration.clone())
        .at_subject(Stage::Registration, Subject::Player(user_id))?;
    info!(season = season.number, user = username, "registered player");
    Ok(registration)
}
