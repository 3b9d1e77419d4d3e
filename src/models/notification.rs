use crate::models::scrim::ScrimId;
use crate::models::user::UserId;
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NotificationId = Uuid;

/// A message for one user about a scrim.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    /// `None` only for legacy records.
    pub scrim: Option<ScrimId>,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn about_scrim(recipient: UserId, scrim: ScrimId, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            scrim: Some(scrim),
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

impl Document for Notification {
    const COLLECTION: &'static str = "notifications";

    fn id(&self) -> Uuid {
        self.id
    }
}
