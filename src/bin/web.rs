//! Single binary web server: REST API plus the daily cleanup sweep.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. See `Config` for the environment variables.

use actix_web::cookie::Key;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use challenger::api::{self, session_middleware, AppState};
use challenger::events::log_events;
use challenger::scheduler::SweepScheduler;
use challenger::{Config, EventBus, Store};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    let store = match &config.data_file {
        Some(path) => Store::load(path).await.map_err(io::Error::other)?,
        None => {
            log::warn!("DATA_FILE not set, data is kept in memory only");
            Store::new()
        }
    };
    let store = Arc::new(store);

    let events = EventBus::default();
    actix_web::rt::spawn(log_events(events.subscribe()));

    let scheduler = SweepScheduler::start(
        store.clone(),
        events.clone(),
        config.retention,
        &config.sweep_cron,
        config.data_file.clone(),
    )
    .await
    .map_err(io::Error::other)?;

    let key = match &config.session_key {
        Some(bytes) => Key::from(bytes.as_slice()),
        None => {
            log::warn!("SESSION_KEY not set, sessions will not survive a restart");
            Key::generate()
        }
    };

    let state = Data::new(AppState::new(store.clone(), events, config.retention));
    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(session_middleware(key.clone()))
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    if let Err(e) = scheduler.stop().await {
        log::error!("Failed to stop sweep scheduler: {}", e);
    }
    if let Some(path) = &config.data_file {
        store.save(path).await.map_err(io::Error::other)?;
        log::info!("Saved snapshot to {}", path.display());
    }
    Ok(())
}
