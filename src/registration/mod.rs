//! Season registration and registrant categorization.
//!
//! [`register_player`] records a registration during the open window.
//! [`Categorizer`] turns a season's registrations into [`PlayerRecord`]s,
//! classifying each registrant as NEW or RETURNING from league history and
//! computing a single rating from per-variant ratings.
//!
//! [`PlayerRecord`]: crate::model::PlayerRecord

mod categorizer;
mod config;
mod register;

pub use categorizer::Categorizer;
pub use config::CategorizerConfig;
pub use register::register_player;
