//! Teams: an owner plus members, referenced by scrims and tournaments.

use crate::models::user::UserId;
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub owner: UserId,
    /// Includes the owner when the team is created through the API.
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// New team whose only member is its owner.
    pub fn new(name: impl Into<String>, owner: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner,
            members: vec![owner],
            created_at: Utc::now(),
        }
    }

    pub fn has_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }
}

impl Document for Team {
    const COLLECTION: &'static str = "teams";

    fn id(&self) -> Uuid {
        self.id
    }
}
