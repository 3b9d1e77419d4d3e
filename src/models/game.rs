//! Tournament matches.

use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Placeholder from the bracket template, no teams yet.
    #[default]
    Pending,
    Scheduled,
    Completed,
}

/// A single match in one phase of a tournament. `(tournament, phase, slot)` is unique.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament: TournamentId,
    pub phase: usize,
    pub slot: u32,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub format: String,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    /// Always `team_a` or `team_b` when set.
    pub winner: Option<TeamId>,
    #[serde(default)]
    pub status: MatchStatus,
}

impl GameMatch {
    /// Empty slot for a freshly locked bracket.
    pub fn placeholder(tournament: TournamentId, phase: usize, slot: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament,
            phase,
            slot,
            team_a: None,
            team_b: None,
            scheduled_at: None,
            format: String::new(),
            score_a: None,
            score_b: None,
            winner: None,
            status: MatchStatus::Pending,
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.team_a.is_some() && self.team_b.is_some()
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team_a == Some(team) || self.team_b == Some(team)
    }
}

impl Document for GameMatch {
    const COLLECTION: &'static str = "matches";

    fn id(&self) -> Uuid {
        self.id
    }
}
