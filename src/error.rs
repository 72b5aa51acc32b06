//! Crate error type.
//!
//! Every fallible operation returns [`Result`]. Store failures are wrapped
//! with the [`Stage`] in which they happened so a failed rebalance can be
//! traced back to the step and the player or division involved.

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, LeagueError>;

/// Pipeline step in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Registration,
    Categorize,
    PlacementStatus,
    VirtualDivision,
    Priority,
    Partition,
    Rookie,
    DivisionWrite,
    Standings,
    SeasonClose,
    Pairing,
    SeasonStart,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Registration => "registration",
            Stage::Categorize => "categorize",
            Stage::PlacementStatus => "placement status",
            Stage::VirtualDivision => "virtual division",
            Stage::Priority => "priority",
            Stage::Partition => "partition",
            Stage::Rookie => "rookie divisions",
            Stage::DivisionWrite => "division write",
            Stage::Standings => "standings",
            Stage::SeasonClose => "season close",
            Stage::Pairing => "pairing",
            Stage::SeasonStart => "season start",
        };
        f.write_str(name)
    }
}

/// What a failing store call was operating on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    None,
    Season(Uuid),
    Division(Uuid),
    Player(Uuid),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::None => Ok(()),
            Subject::Season(id) => write!(f, " (season {id})"),
            Subject::Division(id) => write!(f, " (division {id})"),
            Subject::Player(id) => write!(f, " (player {id})"),
        }
    }
}

/// Errors returned by the league engine.
#[derive(Debug, Error)]
pub enum LeagueError {
    /// A store read or write failed.
    #[error("store failure during {stage}{subject}: {source}")]
    Store {
        stage: Stage,
        subject: Subject,
        #[source]
        source: StoreError,
    },

    /// A configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The partitioner found no feasible division layout.
    #[error("no feasible partition for {players} players")]
    NoFeasiblePartition { players: usize },

    /// The partitioner refused an oversized input.
    #[error("{players} players exceeds the partition limit of {max}")]
    TooManyPlayers { players: usize, max: usize },

    /// The caller's cancellation flag was raised before any result existed.
    #[error("operation cancelled")]
    Cancelled,

    /// A pairing request could not be satisfied.
    #[error("invalid pairing request: {0}")]
    InvalidPairing(String),

    /// A manual or lifecycle operation was rejected.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The external game collaborator failed.
    #[error("game creation failed: {0}")]
    GameCreation(String),
}

impl LeagueError {
    /// Builds a [`LeagueError::Store`] at `stage` about `subject`.
    pub fn store(stage: Stage, subject: Subject, source: StoreError) -> Self {
        LeagueError::Store {
            stage,
            subject,
            source,
        }
    }

    /// Returns the pipeline stage for store failures.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            LeagueError::Store { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Attaches stage context to store results.
pub trait StoreContext<T> {
    /// Wraps a store error with the stage only.
    fn at(self, stage: Stage) -> Result<T>;

    /// Wraps a store error with the stage and the entity involved.
    fn at_subject(self, stage: Stage, subject: Subject) -> Result<T>;
}

impl<T> StoreContext<T> for std::result::Result<T, StoreError> {
    fn at(self, stage: Stage) -> Result<T> {
        self.map_err(|e| LeagueError::store(stage, Subject::None, e))
    }

    fn at_subject(self, stage: Stage, subject: Subject) -> Result<T> {
        self.map_err(|e| LeagueError::store(stage, subject, e))
    }
}
