use crate::api::error::ApiError;
use crate::api::session::current_user;
use crate::api::AppState;
use crate::logic::{delete_scrim, post_scrim, request_scrim};
use crate::models::{ScrimId, TeamId};
use actix_session::Session;
use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct PostScrimBody {
    team_id: TeamId,
    scheduled_at: DateTime<Utc>,
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "BO1".to_string()
}

#[derive(Deserialize)]
struct RequestScrimBody {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct ScrimPath {
    id: ScrimId,
}

#[post("/api/scrims")]
pub(super) async fn create_scrim(
    state: Data<AppState>,
    session: Session,
    body: Json<PostScrimBody>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let scrim = post_scrim(
        &state.store,
        actor,
        body.team_id,
        body.scheduled_at,
        &body.format,
    )
    .await?;
    Ok(HttpResponse::Created().json(scrim))
}

#[get("/api/scrims/{id}")]
pub(super) async fn get_scrim(
    state: Data<AppState>,
    path: Path<ScrimPath>,
) -> Result<HttpResponse, ApiError> {
    let scrim = state
        .store
        .scrims
        .find_by_id(path.id)
        .await
        .ok_or_else(|| ApiError::NotFound("No such scrim".into()))?;
    Ok(HttpResponse::Ok().json(scrim))
}

/// Request to play a scrim with one of the signed-in user's teams.
#[post("/api/scrims/{id}/requests")]
pub(super) async fn add_request(
    state: Data<AppState>,
    session: Session,
    path: Path<ScrimPath>,
    body: Json<RequestScrimBody>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let scrim = request_scrim(&state.store, &state.events, actor, path.id, body.team_id).await?;
    Ok(HttpResponse::Ok().json(scrim))
}

#[delete("/api/scrims/{id}")]
pub(super) async fn remove_scrim(
    state: Data<AppState>,
    session: Session,
    path: Path<ScrimPath>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    delete_scrim(&state.store, &state.events, actor, path.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
