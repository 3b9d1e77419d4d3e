//! Cookie session holding the acting user's id.
//!
//! OAuth and passwords live outside this service; signing in here only binds the
//! session to an existing user.

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::models::UserId;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::web::{Data, Json};
use actix_web::{delete, post, HttpResponse};
use serde::Deserialize;

pub const SESSION_COOKIE: &str = "challenger_session";
const USER_KEY: &str = "user_id";

/// Signed (not encrypted) cookie session. Plain HTTP is allowed.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(false)
        .build()
}

/// The signed-in user, or `Unauthorized`.
pub fn current_user(session: &Session) -> Result<UserId, ApiError> {
    session
        .get::<UserId>(USER_KEY)
        .map_err(|_| ApiError::Unauthorized)?
        .ok_or(ApiError::Unauthorized)
}

#[derive(Deserialize)]
struct SignInBody {
    user_id: UserId,
}

#[post("/api/session")]
pub(super) async fn sign_in(
    state: Data<AppState>,
    session: Session,
    body: Json<SignInBody>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .store
        .users
        .find_by_id(body.user_id)
        .await
        .ok_or_else(|| ApiError::NotFound("No such user".into()))?;
    session.renew();
    session
        .insert(USER_KEY, user.id)
        .map_err(|e| ApiError::Internal(format!("session insert failed: {e}")))?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/api/session")]
pub(super) async fn sign_out(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}
