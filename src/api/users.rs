//! User registration and removal.
//!
//! Deleting a user does not touch the documents that reference them; the cleanup
//! sweep takes care of teams, tournaments and referee lists left behind.

use crate::api::error::ApiError;
use crate::api::session::current_user;
use crate::api::AppState;
use crate::models::{User, UserId};
use actix_session::Session;
use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
struct CreateUserBody {
    username: String,
}

#[derive(Deserialize)]
struct UserPath {
    id: UserId,
}

/// Register a user. Usernames are unique (case-insensitive); the first user is an admin.
#[post("/api/users")]
pub(super) async fn create_user(
    state: Data<AppState>,
    body: Json<CreateUserBody>,
) -> Result<HttpResponse, ApiError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".into()));
    }
    let taken = state
        .store
        .users
        .find_one(|u| u.username.eq_ignore_ascii_case(username))
        .await
        .is_some();
    if taken {
        return Err(ApiError::BadRequest("Username already taken".into()));
    }
    let user = if state.store.users.count().await == 0 {
        log::info!("First user {} registered as admin", username);
        User::admin(username)
    } else {
        User::new(username)
    };
    let user = state.store.users.create(user).await?;
    Ok(HttpResponse::Created().json(user))
}

#[get("/api/users/{id}")]
pub(super) async fn get_user(
    state: Data<AppState>,
    path: Path<UserPath>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .store
        .users
        .find_by_id(path.id)
        .await
        .ok_or_else(|| ApiError::NotFound("No such user".into()))?;
    Ok(HttpResponse::Ok().json(user))
}

/// Delete a user account. Allowed for the user themself or an admin.
#[delete("/api/users/{id}")]
pub(super) async fn delete_user(
    state: Data<AppState>,
    session: Session,
    path: Path<UserPath>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    if actor != path.id {
        let is_admin = state
            .store
            .users
            .find_by_id(actor)
            .await
            .is_some_and(|u| u.is_admin());
        if !is_admin {
            return Err(ApiError::Forbidden("Cannot delete another user".into()));
        }
    }
    state
        .store
        .users
        .delete(path.id)
        .await
        .ok_or_else(|| ApiError::NotFound("No such user".into()))?;
    if actor == path.id {
        session.purge();
    }
    log::info!("User {} deleted", path.id);
    Ok(HttpResponse::NoContent().finish())
}
