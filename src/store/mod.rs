//! Schema-less document store: one typed collection per entity, no foreign keys.
//! References between documents are plain ids and may dangle; see `logic::sweep`.
//!
//! Data lives in memory and can be snapshotted to a JSON file.

mod collection;

pub use collection::{Collection, Document};

use crate::models::{Chat, GameMatch, Notification, Scrim, Team, Tournament, User};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} document {id} not found")]
    NotFound { collection: &'static str, id: Uuid },
    #[error("{collection} document {id} already exists")]
    Duplicate { collection: &'static str, id: Uuid },
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot format error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: Collection<User>,
    pub teams: Collection<Team>,
    pub scrims: Collection<Scrim>,
    pub chats: Collection<Chat>,
    pub notifications: Collection<Notification>,
    pub tournaments: Collection<Tournament>,
    pub matches: Collection<GameMatch>,
}

/// On-disk form of the whole store.
#[derive(Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    teams: Vec<Team>,
    #[serde(default)]
    scrims: Vec<Scrim>,
    #[serde(default)]
    chats: Vec<Chat>,
    #[serde(default)]
    notifications: Vec<Notification>,
    #[serde(default)]
    tournaments: Vec<Tournament>,
    #[serde(default)]
    matches: Vec<GameMatch>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot written by `save`. A missing file gives an empty store.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No snapshot at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        log::info!(
            "Loaded snapshot from {}: {} users, {} teams, {} scrims, {} tournaments",
            path.display(),
            snapshot.users.len(),
            snapshot.teams.len(),
            snapshot.scrims.len(),
            snapshot.tournaments.len()
        );
        Ok(Self {
            users: Collection::from_docs(snapshot.users),
            teams: Collection::from_docs(snapshot.teams),
            scrims: Collection::from_docs(snapshot.scrims),
            chats: Collection::from_docs(snapshot.chats),
            notifications: Collection::from_docs(snapshot.notifications),
            tournaments: Collection::from_docs(snapshot.tournaments),
            matches: Collection::from_docs(snapshot.matches),
        })
    }

    /// Write every collection to `path` (via a temp file, then rename).
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            users: self.users.all().await,
            teams: self.teams.all().await,
            scrims: self.scrims.all().await,
            chats: self.chats.all().await,
            notifications: self.notifications.all().await,
            tournaments: self.tournaments.all().await,
            matches: self.matches.all().await,
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        log::debug!("Saved snapshot to {}", path.display());
        Ok(())
    }
}
