//! Posting, requesting and deleting scrims.

use crate::events::{Event, EventBus};
use crate::models::{Chat, Notification, Scrim, ScrimId, TeamId, UserId};
use crate::store::{Store, StoreError};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrimError {
    #[error("Scrim {0} not found")]
    ScrimNotFound(ScrimId),
    #[error("Team {0} not found")]
    TeamNotFound(TeamId),
    #[error("Only the team owner can do this")]
    NotTeamOwner,
    #[error("A team cannot request its own scrim")]
    OwnScrim,
    #[error("Team {0} already requested this scrim")]
    AlreadyRequested(TeamId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Post a scrim for `team_id` (owned by `actor`) and open its chat.
pub async fn post_scrim(
    store: &Store,
    actor: UserId,
    team_id: TeamId,
    scheduled_at: DateTime<Utc>,
    format: &str,
) -> Result<Scrim, ScrimError> {
    let team = store
        .teams
        .find_by_id(team_id)
        .await
        .ok_or(ScrimError::TeamNotFound(team_id))?;
    if team.owner != actor {
        return Err(ScrimError::NotTeamOwner);
    }
    let scrim = store
        .scrims
        .create(Scrim::new(team_id, scheduled_at, format.trim()))
        .await?;
    store.chats.create(Chat::for_scrim(scrim.id)).await?;
    log::info!("Scrim {} posted by team {}", scrim.id, team.name);
    Ok(scrim)
}

/// Ask to play a scrim with `team_id`. The posting team's owner is notified.
pub async fn request_scrim(
    store: &Store,
    events: &EventBus,
    actor: UserId,
    scrim_id: ScrimId,
    team_id: TeamId,
) -> Result<Scrim, ScrimError> {
    let team = store
        .teams
        .find_by_id(team_id)
        .await
        .ok_or(ScrimError::TeamNotFound(team_id))?;
    if team.owner != actor {
        return Err(ScrimError::NotTeamOwner);
    }
    let scrim = store
        .scrims
        .try_update(scrim_id, |s: &mut Scrim| {
            if s.team_a == team_id {
                return Err(ScrimError::OwnScrim);
            }
            if s.requests.contains(&team_id) {
                return Err(ScrimError::AlreadyRequested(team_id));
            }
            s.requests.push(team_id);
            Ok(())
        })
        .await
        .map_err(|e| match e {
            ScrimError::Store(StoreError::NotFound { .. }) => ScrimError::ScrimNotFound(scrim_id),
            other => other,
        })?;

    if let Some(poster) = store.teams.find_by_id(scrim.team_a).await {
        let notification = store
            .notifications
            .create(Notification::about_scrim(
                poster.owner,
                scrim.id,
                format!("{} requested your scrim", team.name),
            ))
            .await?;
        events.publish(Event::NewNotification {
            recipient: poster.owner,
            notification: notification.id,
        });
    }
    Ok(scrim)
}

/// Delete a scrim with its chat and notifications. Only the posting team's owner may.
pub async fn delete_scrim(
    store: &Store,
    events: &EventBus,
    actor: UserId,
    scrim_id: ScrimId,
) -> Result<(), ScrimError> {
    let scrim = store
        .scrims
        .find_by_id(scrim_id)
        .await
        .ok_or(ScrimError::ScrimNotFound(scrim_id))?;
    let owner = store.teams.find_by_id(scrim.team_a).await.map(|t| t.owner);
    if owner != Some(actor) {
        return Err(ScrimError::NotTeamOwner);
    }
    let chats = store.chats.delete_many(|c| c.scrim == Some(scrim_id)).await;
    let notifications = store
        .notifications
        .delete_many(|n| n.scrim == Some(scrim_id))
        .await;
    store.scrims.delete(scrim_id).await;
    events.publish(Event::ScrimDeleted { scrim: scrim_id });
    log::info!(
        "Scrim {} deleted with {} chat(s) and {} notification(s)",
        scrim_id,
        chats,
        notifications
    );
    Ok(())
}
