//! Tournament endpoints: registration, status transitions, matches, bracket templates.

use crate::api::error::ApiError;
use crate::api::session::current_user;
use crate::api::AppState;
use crate::logic::{self, generate_bracket, MatchResult, NewTournament, Seeding};
use crate::models::{MatchId, TeamId, TournamentId, TournamentStatus};
use actix_session::Session;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, post, put, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct RefereeBody {
    code: String,
}

#[derive(Deserialize)]
struct StatusBody {
    status: TournamentStatus,
}

#[derive(Deserialize)]
struct TemplateQuery {
    team_count: usize,
    bracket_type: String,
}

#[derive(Serialize)]
struct TemplateResponse {
    team_count: usize,
    bracket_type: String,
    slots: Vec<logic::SlotDescriptor>,
}

#[post("/api/tournaments")]
pub(super) async fn create_tournament(
    state: Data<AppState>,
    session: Session,
    body: Json<NewTournament>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let tournament = logic::create_tournament(&state.store, actor, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(tournament))
}

#[get("/api/tournaments/{id}")]
pub(super) async fn get_tournament(
    state: Data<AppState>,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, ApiError> {
    let tournament = logic::get_tournament(&state.store, path.id).await?;
    Ok(HttpResponse::Ok().json(tournament))
}

/// Delete a tournament and its matches (organizer only).
#[delete("/api/tournaments/{id}")]
pub(super) async fn delete_tournament(
    state: Data<AppState>,
    session: Session,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    logic::delete_tournament(&state.store, actor, path.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register one of the signed-in user's teams (pending confirmation).
#[post("/api/tournaments/{id}/teams")]
pub(super) async fn register_team(
    state: Data<AppState>,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<RegisterTeamBody>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let tournament = logic::register_team(&state.store, actor, path.id, body.team_id).await?;
    Ok(HttpResponse::Ok().json(tournament))
}

#[post("/api/tournaments/{id}/teams/{team_id}/confirm")]
pub(super) async fn confirm_team(
    state: Data<AppState>,
    session: Session,
    path: Path<TournamentTeamPath>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let tournament = logic::confirm_team(&state.store, actor, path.id, path.team_id).await?;
    Ok(HttpResponse::Ok().json(tournament))
}

/// Join as a referee using the tournament's referee code.
#[post("/api/tournaments/{id}/referees")]
pub(super) async fn join_as_referee(
    state: Data<AppState>,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<RefereeBody>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let tournament = logic::join_as_referee(&state.store, actor, path.id, &body.code).await?;
    Ok(HttpResponse::Ok().json(tournament))
}

/// Move the tournament to another status (organizer only).
#[put("/api/tournaments/{id}/status")]
pub(super) async fn set_status(
    state: Data<AppState>,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<StatusBody>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let tournament =
        logic::transition_status(&state.store, &state.events, actor, path.id, body.status).await?;
    Ok(HttpResponse::Ok().json(tournament))
}

#[get("/api/tournaments/{id}/matches")]
pub(super) async fn list_matches(
    state: Data<AppState>,
    path: Path<TournamentPath>,
) -> Result<HttpResponse, ApiError> {
    let matches = logic::list_matches(&state.store, path.id).await?;
    Ok(HttpResponse::Ok().json(matches))
}

#[put("/api/tournaments/{id}/matches/{match_id}/teams")]
pub(super) async fn seed_match(
    state: Data<AppState>,
    session: Session,
    path: Path<TournamentMatchPath>,
    body: Json<Seeding>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let game_match = logic::seed_match(
        &state.store,
        &state.events,
        actor,
        path.id,
        path.match_id,
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(game_match))
}

/// Record a result (organizer or referee).
#[put("/api/tournaments/{id}/matches/{match_id}/result")]
pub(super) async fn record_result(
    state: Data<AppState>,
    session: Session,
    path: Path<TournamentMatchPath>,
    body: Json<MatchResult>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let game_match = logic::record_result(
        &state.store,
        &state.events,
        actor,
        path.id,
        path.match_id,
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(game_match))
}

/// Empty bracket layout for a team count, e.g. `?team_count=8&bracket_type=SINGLE_ELIM`.
#[get("/api/brackets/template")]
pub(super) async fn bracket_template(
    query: Query<TemplateQuery>,
) -> Result<HttpResponse, ApiError> {
    let slots = generate_bracket(query.team_count, &query.bracket_type)?;
    Ok(HttpResponse::Ok().json(TemplateResponse {
        team_count: query.team_count,
        bracket_type: query.bracket_type.clone(),
        slots,
    }))
}
