//! Rookie divisions.
//!
//! A season with enough first-time players gives them their own divisions,
//! numbered from [`ROOKIE_DIVISION_BASE`] and sized between the configured
//! bounds. The season after, rookies graduate into the regular ladder in
//! rank-ordered groups that target successive regular divisions.
//!
//! [`ROOKIE_DIVISION_BASE`]: crate::model::ROOKIE_DIVISION_BASE

mod builder;
mod config;
mod graduation;
mod sizing;

pub use builder::{RookieBuilder, RookiePlan};
pub use config::RookieConfig;
pub use graduation::{graduation_group_sizes, graduation_targets};
pub use sizing::rookie_division_sizes;
