//! Manual cleanup sweep trigger (admins only).

use crate::api::error::ApiError;
use crate::api::session::current_user;
use crate::api::AppState;
use crate::logic::{run_sweep, SweepOptions};
use actix_session::Session;
use actix_web::web::{Data, Query};
use actix_web::{post, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
struct SweepQuery {
    /// Defaults to a dry run; pass `dry_run=false` to apply changes.
    #[serde(default = "default_dry_run")]
    dry_run: bool,
    #[serde(default)]
    verbose: bool,
}

fn default_dry_run() -> bool {
    true
}

/// Run the sweep now and return its report. Does not coordinate with the scheduled run.
#[post("/api/admin/sweep")]
pub(super) async fn trigger_sweep(
    state: Data<AppState>,
    session: Session,
    query: Query<SweepQuery>,
) -> Result<HttpResponse, ApiError> {
    let actor = current_user(&session)?;
    let is_admin = state
        .store
        .users
        .find_by_id(actor)
        .await
        .is_some_and(|u| u.is_admin());
    if !is_admin {
        return Err(ApiError::Forbidden("Admins only".into()));
    }
    let options = SweepOptions {
        dry_run: query.dry_run,
        verbose: query.verbose,
        retention: state.retention,
    };
    log::info!("Sweep triggered by {} (dry_run={})", actor, options.dry_run);
    let report = run_sweep(&state.store, &state.events, &options).await?;
    Ok(HttpResponse::Ok().json(report))
}
