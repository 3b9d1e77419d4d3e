//! Scrims (practice match proposals) and their chat.

use crate::models::team::TeamId;
use crate::models::user::UserId;
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scrim.
pub type ScrimId = Uuid;

/// Unique identifier for a scrim chat.
pub type ChatId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrimStatus {
    #[default]
    Open,
    Accepted,
}

/// A practice match posted by `team_a`, optionally accepted by `team_b`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Scrim {
    pub id: ScrimId,
    /// The posting team.
    pub team_a: TeamId,
    pub team_b: Option<TeamId>,
    /// Teams that asked to play this scrim.
    #[serde(default)]
    pub requests: Vec<TeamId>,
    pub scheduled_at: DateTime<Utc>,
    pub format: String,
    #[serde(default)]
    pub status: ScrimStatus,
    pub created_at: DateTime<Utc>,
}

impl Scrim {
    pub fn new(team_a: TeamId, scheduled_at: DateTime<Utc>, format: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_a,
            team_b: None,
            requests: Vec::new(),
            scheduled_at,
            format: format.into(),
            status: ScrimStatus::Open,
            created_at: Utc::now(),
        }
    }
}

impl Document for Scrim {
    const COLLECTION: &'static str = "scrims";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: UserId,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Chat attached to a scrim.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    /// `None` only for records written before chats were tied to scrims.
    pub scrim: Option<ScrimId>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl Chat {
    pub fn for_scrim(scrim: ScrimId) -> Self {
        Self {
            id: Uuid::new_v4(),
            scrim: Some(scrim),
            messages: Vec::new(),
        }
    }
}

impl Document for Chat {
    const COLLECTION: &'static str = "chats";

    fn id(&self) -> Uuid {
        self.id
    }
}
