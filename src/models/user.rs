//! User accounts.

use crate::models::team::TeamId;
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user.
pub type UserId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    User,
    /// May trigger the cleanup sweep by hand.
    Admin,
}

/// A registered user.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
    /// Teams this user belongs to (owner or member).
    #[serde(default)]
    pub teams: Vec<TeamId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            role: UserRole::User,
            teams: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            role: UserRole::Admin,
            ..Self::new(username)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }
}
