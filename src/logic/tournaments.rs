//! Organizer- and referee-facing tournament operations, persisted through the store.

use crate::events::{Event, EventBus};
use crate::logic::bracket::bracket_template;
use crate::logic::lifecycle::{advance_status, MIN_TEAMS};
use crate::logic::referee_code::generate_unique_code;
use crate::models::{
    BracketType, GameMatch, MatchId, MatchStatus, Phase, PhaseStatus, TeamId, Tournament,
    TournamentError, TournamentId, TournamentStatus, UserId,
};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Input for `create_tournament`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub game: String,
    pub start_date: DateTime<Utc>,
    pub max_participants: u32,
    /// One entry per phase. Empty means a single single-elimination phase.
    #[serde(default)]
    pub phases: Vec<BracketType>,
}

/// Teams and time for one match slot.
#[derive(Clone, Debug, Deserialize)]
pub struct Seeding {
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MatchResult {
    pub score_a: u32,
    pub score_b: u32,
    pub winner: TeamId,
}

fn not_found(kind: &'static str, id: uuid::Uuid) -> TournamentError {
    TournamentError::NotFound { kind, id }
}

pub async fn get_tournament(
    store: &Store,
    id: TournamentId,
) -> Result<Tournament, TournamentError> {
    store
        .tournaments
        .find_by_id(id)
        .await
        .ok_or(not_found("Tournament", id))
}

/// Create a tournament organized by `organizer`, with a fresh referee code.
pub async fn create_tournament(
    store: &Store,
    organizer: UserId,
    input: NewTournament,
) -> Result<Tournament, TournamentError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(TournamentError::Invalid("Tournament name is required".into()));
    }
    if (input.max_participants as usize) < MIN_TEAMS {
        return Err(TournamentError::Invalid(format!(
            "max_participants must be at least {}",
            MIN_TEAMS
        )));
    }
    if !store.users.exists(organizer).await {
        return Err(not_found("User", organizer));
    }
    let phases = if input.phases.is_empty() {
        vec![Phase::new(BracketType::SingleElim)]
    } else {
        input.phases.into_iter().map(Phase::new).collect()
    };
    let code = generate_unique_code(store).await;
    let mut tournament = Tournament::new(
        name,
        input.game.trim(),
        input.start_date,
        input.max_participants,
        phases,
        organizer,
        code,
    );
    tournament.description = input.description;
    let tournament = store.tournaments.create(tournament).await?;
    log::info!("Tournament {} ({}) created by {}", tournament.id, tournament.name, organizer);
    Ok(tournament)
}

/// Delete a tournament and its matches. Organizer only. Returns the number of matches removed.
pub async fn delete_tournament(
    store: &Store,
    actor: UserId,
    id: TournamentId,
) -> Result<usize, TournamentError> {
    let tournament = get_tournament(store, id).await?;
    if tournament.organizer != actor {
        return Err(TournamentError::NotOrganizer);
    }
    let matches = store.matches.delete_many(|m| m.tournament == id).await;
    store.tournaments.delete(id).await;
    log::info!("Tournament {} deleted with {} match(es)", id, matches);
    Ok(matches)
}

/// Register a team (pending confirmation). Team owner only, while registration is open.
pub async fn register_team(
    store: &Store,
    actor: UserId,
    id: TournamentId,
    team_id: TeamId,
) -> Result<Tournament, TournamentError> {
    let team = store
        .teams
        .find_by_id(team_id)
        .await
        .ok_or(not_found("Team", team_id))?;
    if team.owner != actor {
        return Err(TournamentError::NotTeamOwner);
    }
    store
        .tournaments
        .try_update(id, |t: &mut Tournament| {
            if t.status != TournamentStatus::RegistrationOpen {
                return Err(TournamentError::RegistrationClosed);
            }
            if t.is_registered(team_id) {
                return Err(TournamentError::AlreadyRegistered(team_id));
            }
            if t.pending_teams.len() + t.confirmed_teams.len() >= t.max_participants as usize {
                return Err(TournamentError::TournamentFull);
            }
            t.pending_teams.push(team_id);
            Ok(())
        })
        .await
        .map_err(|e| store_not_found_as("Tournament", id, e))
}

/// Move a pending team to the confirmed list. Organizer only.
pub async fn confirm_team(
    store: &Store,
    actor: UserId,
    id: TournamentId,
    team_id: TeamId,
) -> Result<Tournament, TournamentError> {
    store
        .tournaments
        .try_update(id, |t: &mut Tournament| {
            if t.organizer != actor {
                return Err(TournamentError::NotOrganizer);
            }
            if matches!(
                t.status,
                TournamentStatus::BracketLocked
                    | TournamentStatus::InProgress
                    | TournamentStatus::Complete
            ) {
                return Err(TournamentError::WrongStatus(t.status));
            }
            let idx = t
                .pending_teams
                .iter()
                .position(|&p| p == team_id)
                .ok_or(TournamentError::TeamNotPending(team_id))?;
            t.pending_teams.remove(idx);
            t.confirmed_teams.push(team_id);
            Ok(())
        })
        .await
        .map_err(|e| store_not_found_as("Tournament", id, e))
}

/// Add `actor` to the referees if `code` matches the tournament's referee code.
pub async fn join_as_referee(
    store: &Store,
    actor: UserId,
    id: TournamentId,
    code: &str,
) -> Result<Tournament, TournamentError> {
    let code = code.trim().to_ascii_uppercase();
    store
        .tournaments
        .try_update(id, |t: &mut Tournament| {
            if t.referee_code != code {
                return Err(TournamentError::InvalidRefereeCode);
            }
            if !t.referees.contains(&actor) {
                t.referees.push(actor);
            }
            Ok(())
        })
        .await
        .map_err(|e| store_not_found_as("Tournament", id, e))
}

/// Change status through the state machine. Organizer only.
///
/// Locking the bracket pre-allocates every phase's match slots from its template.
/// The slots are written before the new status is saved, so a tournament is never
/// BRACKET_LOCKED without them. If saving the status then fails, the slots are removed.
pub async fn transition_status(
    store: &Store,
    events: &EventBus,
    actor: UserId,
    id: TournamentId,
    target: TournamentStatus,
) -> Result<Tournament, TournamentError> {
    let current = get_tournament(store, id).await?;
    if current.organizer != actor {
        return Err(TournamentError::NotOrganizer);
    }
    let mut next = current;
    advance_status(&mut next, target)?;

    let generated = if target == TournamentStatus::BracketLocked {
        Some(generate_matches(store, &next).await?)
    } else {
        None
    };

    let saved = store
        .tournaments
        .try_update(id, |t: &mut Tournament| {
            if t.organizer != actor {
                return Err(TournamentError::NotOrganizer);
            }
            advance_status(t, target)
        })
        .await
        .map_err(|e| store_not_found_as("Tournament", id, e));
    let tournament = match saved {
        Ok(tournament) => tournament,
        Err(e) => {
            if generated.is_some() {
                store.matches.delete_many(|m| m.tournament == id).await;
            }
            return Err(e);
        }
    };
    log::info!("Tournament {} is now {}", id, target);

    if let Some(count) = generated {
        events.publish(Event::MatchesGenerated {
            tournament: id,
            count,
        });
    }
    events.publish(Event::TournamentStatusChanged {
        tournament: id,
        status: target,
    });
    Ok(tournament)
}

/// Replace the tournament's matches with empty slots for each phase.
async fn generate_matches(
    store: &Store,
    tournament: &Tournament,
) -> Result<usize, TournamentError> {
    let id = tournament.id;
    store.matches.delete_many(|m| m.tournament == id).await;
    let placeholders: Vec<GameMatch> = tournament
        .phases
        .iter()
        .enumerate()
        .flat_map(|(phase, p)| {
            bracket_template(tournament.team_count(), p.bracket_type)
                .into_iter()
                .map(move |s| GameMatch::placeholder(id, phase, s.slot))
        })
        .collect();
    let count = store.matches.create_many(placeholders).await?;
    log::info!("Generated {} match slot(s) for tournament {}", count, id);
    Ok(count)
}

/// Matches of a tournament ordered by phase, then slot.
pub async fn list_matches(
    store: &Store,
    id: TournamentId,
) -> Result<Vec<GameMatch>, TournamentError> {
    get_tournament(store, id).await?;
    let mut matches = store.matches.find(|m| m.tournament == id).await;
    matches.sort_by_key(|m| (m.phase, m.slot));
    Ok(matches)
}

/// Put two confirmed teams into a slot. Organizer only, once the bracket is locked.
pub async fn seed_match(
    store: &Store,
    events: &EventBus,
    actor: UserId,
    id: TournamentId,
    match_id: MatchId,
    seeding: Seeding,
) -> Result<GameMatch, TournamentError> {
    let tournament = get_tournament(store, id).await?;
    if tournament.organizer != actor {
        return Err(TournamentError::NotOrganizer);
    }
    if !matches!(
        tournament.status,
        TournamentStatus::BracketLocked | TournamentStatus::InProgress
    ) {
        return Err(TournamentError::WrongStatus(tournament.status));
    }
    for team in [seeding.team_a, seeding.team_b] {
        if !tournament.confirmed_teams.contains(&team) {
            return Err(TournamentError::TeamNotConfirmed(team));
        }
    }
    if seeding.team_a == seeding.team_b {
        return Err(TournamentError::Invalid("A team cannot play itself".into()));
    }
    let updated = store
        .matches
        .try_update(match_id, |m: &mut GameMatch| {
            if m.tournament != id {
                return Err(not_found("Match", match_id));
            }
            if m.status == MatchStatus::Completed {
                return Err(TournamentError::Invalid("Match already has a result".into()));
            }
            m.team_a = Some(seeding.team_a);
            m.team_b = Some(seeding.team_b);
            m.scheduled_at = seeding.scheduled_at;
            if let Some(format) = seeding.format {
                m.format = format;
            }
            m.status = MatchStatus::Scheduled;
            Ok(())
        })
        .await
        .map_err(|e| store_not_found_as("Match", match_id, e))?;
    events.publish(Event::MatchUpdated {
        tournament: id,
        game_match: match_id,
    });
    Ok(updated)
}

/// Record scores and winner. Organizer or referee, while the tournament is in progress.
///
/// The match's phase becomes IN_PROGRESS, or COMPLETE once all of its matches are completed.
pub async fn record_result(
    store: &Store,
    events: &EventBus,
    actor: UserId,
    id: TournamentId,
    match_id: MatchId,
    result: MatchResult,
) -> Result<GameMatch, TournamentError> {
    let tournament = get_tournament(store, id).await?;
    if !tournament.is_official(actor) {
        return Err(TournamentError::NotOfficial);
    }
    if tournament.status != TournamentStatus::InProgress {
        return Err(TournamentError::WrongStatus(tournament.status));
    }
    let updated = store
        .matches
        .try_update(match_id, |m: &mut GameMatch| {
            if m.tournament != id {
                return Err(not_found("Match", match_id));
            }
            if !m.is_seeded() {
                return Err(TournamentError::MatchNotSeeded);
            }
            if !m.involves(result.winner) {
                return Err(TournamentError::InvalidWinner(result.winner));
            }
            m.score_a = Some(result.score_a);
            m.score_b = Some(result.score_b);
            m.winner = Some(result.winner);
            m.status = MatchStatus::Completed;
            Ok(())
        })
        .await
        .map_err(|e| store_not_found_as("Match", match_id, e))?;

    let phase = updated.phase;
    let open = store
        .matches
        .find(|m| m.tournament == id && m.phase == phase && m.status != MatchStatus::Completed)
        .await
        .len();
    let phase_status = if open == 0 {
        PhaseStatus::Complete
    } else {
        PhaseStatus::InProgress
    };
    store
        .tournaments
        .update(id, |t| {
            if let Some(p) = t.phases.get_mut(phase) {
                p.status = phase_status;
            }
        })
        .await?;

    events.publish(Event::MatchUpdated {
        tournament: id,
        game_match: match_id,
    });
    Ok(updated)
}

/// A missing document surfaces as `NotFound` rather than a store failure.
fn store_not_found_as(
    kind: &'static str,
    id: uuid::Uuid,
    err: TournamentError,
) -> TournamentError {
    match err {
        TournamentError::Store(crate::store::StoreError::NotFound { .. }) => not_found(kind, id),
        other => other,
    }
}
