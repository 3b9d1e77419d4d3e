//! Tournament status state machine: transition table plus readiness checks.

use crate::models::{PhaseStatus, Tournament, TournamentError, TournamentStatus};
use serde::Serialize;

/// Fewest confirmed teams a tournament can lock registration or its bracket with.
pub const MIN_TEAMS: usize = 2;

/// Statuses reachable from `from` in one step.
pub fn allowed_targets(from: TournamentStatus) -> &'static [TournamentStatus] {
    use TournamentStatus::*;
    match from {
        RegistrationOpen => &[RegistrationLocked],
        RegistrationLocked => &[RegistrationOpen, BracketLocked],
        BracketLocked => &[InProgress],
        InProgress => &[Complete],
        Complete => &[],
    }
}

/// True iff `target` is in the allow-list for `current`. Ignores tournament content.
pub fn can_transition(current: TournamentStatus, target: TournamentStatus) -> bool {
    allowed_targets(current).contains(&target)
}

/// Outcome of `check_readiness`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Readiness {
    pub valid: bool,
    /// Set when `valid` is false.
    pub reason: Option<String>,
}

impl Readiness {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Preconditions on the tournament itself for moving to `target`.
pub fn check_readiness(tournament: &Tournament, target: TournamentStatus) -> Readiness {
    use TournamentStatus::*;
    let teams = tournament.team_count();
    let require_status = |needed: TournamentStatus| {
        if tournament.status == needed {
            Readiness::ok()
        } else {
            Readiness::fail(format!(
                "Tournament must be {} to move to {} (currently {})",
                needed, target, tournament.status
            ))
        }
    };
    match target {
        RegistrationLocked if teams < MIN_TEAMS => Readiness::fail(format!(
            "Need at least {} confirmed teams to lock registration (have {})",
            MIN_TEAMS, teams
        )),
        BracketLocked if teams < MIN_TEAMS => Readiness::fail(format!(
            "Need at least {} confirmed teams to lock the bracket (have {})",
            MIN_TEAMS, teams
        )),
        BracketLocked => require_status(RegistrationLocked),
        InProgress => require_status(BracketLocked),
        Complete => require_status(InProgress),
        _ => Readiness::ok(),
    }
}

/// Move the tournament to `target` if both the transition table and the readiness
/// check allow it. On error nothing is changed.
///
/// Also keeps phase statuses in step: starting the tournament starts its first phase,
/// completing it completes every phase.
pub fn advance_status(
    tournament: &mut Tournament,
    target: TournamentStatus,
) -> Result<(), TournamentError> {
    if !can_transition(tournament.status, target) {
        return Err(TournamentError::InvalidTransition {
            from: tournament.status,
            to: target,
        });
    }
    let readiness = check_readiness(tournament, target);
    if !readiness.valid {
        return Err(TournamentError::ReadinessNotMet(
            readiness.reason.unwrap_or_default(),
        ));
    }
    tournament.status = target;
    match target {
        TournamentStatus::InProgress => {
            if let Some(first) = tournament.phases.first_mut() {
                first.status = PhaseStatus::InProgress;
            }
        }
        TournamentStatus::Complete => {
            for phase in &mut tournament.phases {
                phase.status = PhaseStatus::Complete;
            }
        }
        _ => {}
    }
    Ok(())
}
