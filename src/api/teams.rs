//! Team creation and membership.

use crate::api::error::ApiError;
use crate::api::session::current_user;
use crate::api::AppState;
use crate::models::{Team, TeamId, UserId};
use actix_session::Session;
use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
struct CreateTeamBody {
    name: String,
}

#[derive(Deserialize)]
struct AddMemberBody {
    user_id: UserId,
}

#[derive(Deserialize)]
struct TeamPath {
    id: TeamId,
}

/// Create a team owned by the signed-in user.
#[post("/api/teams")]
pub(super) async fn create_team(
    state: Data<AppState>,
    session: Session,
    body: Json<CreateTeamBody>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Team name is required".into()));
    }
    if !state.store.users.exists(actor).await {
        return Err(ApiError::Unauthorized);
    }
    let team = state.store.teams.create(Team::new(name, actor)).await?;
    let team_id = team.id;
    state
        .store
        .users
        .update(actor, |u| u.teams.push(team_id))
        .await?;
    Ok(HttpResponse::Created().json(team))
}

#[get("/api/teams/{id}")]
pub(super) async fn get_team(
    state: Data<AppState>,
    path: Path<TeamPath>,
) -> Result<HttpResponse, ApiError> {
    let team = state
        .store
        .teams
        .find_by_id(path.id)
        .await
        .ok_or_else(|| ApiError::NotFound("No such team".into()))?;
    Ok(HttpResponse::Ok().json(team))
}

/// Add a member (owner only).
#[post("/api/teams/{id}/members")]
pub(super) async fn add_member(
    state: Data<AppState>,
    session: Session,
    path: Path<TeamPath>,
    body: Json<AddMemberBody>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let team = state
        .store
        .teams
        .find_by_id(path.id)
        .await
        .ok_or_else(|| ApiError::NotFound("No such team".into()))?;
    if team.owner != actor {
        return Err(ApiError::Forbidden("Only the team owner can add members".into()));
    }
    let user_id = body.user_id;
    if !state.store.users.exists(user_id).await {
        return Err(ApiError::NotFound("No such user".into()));
    }
    let team = state
        .store
        .teams
        .update(team.id, |t| {
            if !t.has_member(user_id) {
                t.members.push(user_id);
            }
        })
        .await?;
    let team_id = team.id;
    state
        .store
        .users
        .update(user_id, |u| {
            if !u.teams.contains(&team_id) {
                u.teams.push(team_id);
            }
        })
        .await?;
    Ok(HttpResponse::Ok().json(team))
}

/// Delete a team (owner only). Scrims it posted are left for the cleanup sweep.
#[delete("/api/teams/{id}")]
pub(super) async fn delete_team(
    state: Data<AppState>,
    session: Session,
    path: Path<TeamPath>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let team = state
        .store
        .teams
        .find_by_id(path.id)
        .await
        .ok_or_else(|| ApiError::NotFound("No such team".into()))?;
    if team.owner != actor {
        return Err(ApiError::Forbidden("Only the team owner can delete the team".into()));
    }
    let id = team.id;
    state
        .store
        .users
        .update_many(|u| u.teams.contains(&id), |u| u.teams.retain(|&t| t != id))
        .await;
    state.store.teams.delete(id).await;
    log::info!("Team {} ({}) deleted", id, team.name);
    Ok(HttpResponse::NoContent().finish())
}
