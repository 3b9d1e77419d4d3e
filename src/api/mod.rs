//! REST API: shared state, route registration, and handlers per resource.

mod admin;
mod error;
mod scrims;
mod session;
mod teams;
mod tournaments;
mod users;

pub use error::ApiError;
pub use session::{current_user, session_middleware, SESSION_COOKIE};

use crate::events::EventBus;
use crate::logic::Retention;
use crate::store::Store;
use actix_web::web::ServiceConfig;
use actix_web::{get, HttpResponse, Responder};
use std::sync::Arc;

/// Shared by every worker.
pub struct AppState {
    pub store: Arc<Store>,
    pub events: EventBus,
    /// Used by the manual sweep trigger.
    pub retention: Retention,
}

impl AppState {
    pub fn new(store: Arc<Store>, events: EventBus, retention: Retention) -> Self {
        Self {
            store,
            events,
            retention,
        }
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "challenger",
    })
}

/// Register every route. Wrap the app in `session_middleware` for the signed-in routes.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(api_health)
        .service(session::sign_in)
        .service(session::sign_out)
        .service(users::create_user)
        .service(users::get_user)
        .service(users::delete_user)
        .service(teams::create_team)
        .service(teams::get_team)
        .service(teams::add_member)
        .service(teams::delete_team)
        .service(scrims::create_scrim)
        .service(scrims::get_scrim)
        .service(scrims::add_request)
        .service(scrims::remove_scrim)
        .service(tournaments::bracket_template)
        .service(tournaments::create_tournament)
        .service(tournaments::get_tournament)
        .service(tournaments::delete_tournament)
        .service(tournaments::register_team)
        .service(tournaments::confirm_team)
        .service(tournaments::join_as_referee)
        .service(tournaments::set_status)
        .service(tournaments::list_matches)
        .service(tournaments::seed_match)
        .service(tournaments::record_result)
        .service(admin::trigger_sweep);
}
