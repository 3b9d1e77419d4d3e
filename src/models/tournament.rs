//! Tournament, its phases, and TournamentStatus.

use crate::models::team::TeamId;
use crate::models::user::UserId;
use crate::store::{Document, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// The status change is not in the transition table.
    #[error("Cannot move tournament from {from} to {to}")]
    InvalidTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },
    /// The transition is allowed but the tournament is not ready for it.
    #[error("{0}")]
    ReadinessNotMet(String),
    #[error("Unsupported bracket type: {0}")]
    UnsupportedBracketType(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },
    #[error("Only the organizer can do this")]
    NotOrganizer,
    #[error("Only the organizer or a referee can do this")]
    NotOfficial,
    #[error("Only the team owner can do this")]
    NotTeamOwner,
    #[error("Registration is closed")]
    RegistrationClosed,
    #[error("Tournament is full")]
    TournamentFull,
    #[error("Team {0} is already registered")]
    AlreadyRegistered(TeamId),
    /// Team is not in the pending list.
    #[error("Team {0} is not awaiting confirmation")]
    TeamNotPending(TeamId),
    #[error("Team {0} is not a confirmed participant")]
    TeamNotConfirmed(TeamId),
    #[error("Referee code does not match")]
    InvalidRefereeCode,
    #[error("Both teams must be seeded before a result is recorded")]
    MatchNotSeeded,
    /// Winner must be one of the two teams playing.
    #[error("Team {0} is not playing this match")]
    InvalidWinner(TeamId),
    /// Seeding or results while the tournament is in the wrong status.
    #[error("Not allowed while tournament is {0}")]
    WrongStatus(TournamentStatus),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle status. See `logic::lifecycle` for the allowed moves.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Teams may register.
    #[default]
    RegistrationOpen,
    RegistrationLocked,
    /// Match placeholders exist; teams are being seeded.
    BracketLocked,
    InProgress,
    Complete,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::RegistrationOpen => "REGISTRATION_OPEN",
            TournamentStatus::RegistrationLocked => "REGISTRATION_LOCKED",
            TournamentStatus::BracketLocked => "BRACKET_LOCKED",
            TournamentStatus::InProgress => "IN_PROGRESS",
            TournamentStatus::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketType {
    SingleElim,
    DoubleElim,
    RoundRobin,
}

impl FromStr for BracketType {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SINGLE_ELIM" => Ok(BracketType::SingleElim),
            "DOUBLE_ELIM" => Ok(BracketType::DoubleElim),
            "ROUND_ROBIN" => Ok(BracketType::RoundRobin),
            other => Err(TournamentError::UnsupportedBracketType(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseStatus {
    #[default]
    Pending,
    InProgress,
    Complete,
}

/// One stage of a tournament (e.g. a round robin followed by single elimination).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub bracket_type: BracketType,
    #[serde(default)]
    pub status: PhaseStatus,
}

impl Phase {
    pub fn new(bracket_type: BracketType) -> Self {
        Self {
            bracket_type,
            status: PhaseStatus::Pending,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    /// Free text, e.g. "Valorant".
    pub game: String,
    pub max_participants: u32,
    pub phases: Vec<Phase>,
    pub organizer: UserId,
    /// Six characters, unique across tournaments. Lets users join as referees.
    pub referee_code: String,
    /// Registered, awaiting organizer confirmation.
    #[serde(default)]
    pub pending_teams: Vec<TeamId>,
    #[serde(default)]
    pub confirmed_teams: Vec<TeamId>,
    #[serde(default)]
    pub referees: Vec<UserId>,
    #[serde(default)]
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a tournament in RegistrationOpen with no teams.
    pub fn new(
        name: impl Into<String>,
        game: impl Into<String>,
        start_date: DateTime<Utc>,
        max_participants: u32,
        phases: Vec<Phase>,
        organizer: UserId,
        referee_code: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            start_date,
            game: game.into(),
            max_participants,
            phases,
            organizer,
            referee_code: referee_code.into(),
            pending_teams: Vec::new(),
            confirmed_teams: Vec::new(),
            referees: Vec::new(),
            status: TournamentStatus::RegistrationOpen,
            created_at: Utc::now(),
        }
    }

    /// Confirmed teams; this is the count used for readiness and bracket size.
    pub fn team_count(&self) -> usize {
        self.confirmed_teams.len()
    }

    pub fn is_registered(&self, team: TeamId) -> bool {
        self.pending_teams.contains(&team) || self.confirmed_teams.contains(&team)
    }

    pub fn is_official(&self, user: UserId) -> bool {
        self.organizer == user || self.referees.contains(&user)
    }
}

impl Document for Tournament {
    const COLLECTION: &'static str = "tournaments";

    fn id(&self) -> Uuid {
        self.id
    }
}
