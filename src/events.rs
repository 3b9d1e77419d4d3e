//! Typed event channel for real-time listeners (socket layer, loggers, tests).
//!
//! Publishing never fails: with no subscribers the event is simply dropped.

use crate::models::{MatchId, NotificationId, ScrimId, TournamentId, TournamentStatus, UserId};
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    ScrimDeleted {
        scrim: ScrimId,
    },
    NewNotification {
        recipient: UserId,
        notification: NotificationId,
    },
    TournamentStatusChanged {
        tournament: TournamentId,
        status: TournamentStatus,
    },
    MatchesGenerated {
        tournament: TournamentId,
        count: usize,
    },
    MatchUpdated {
        tournament: TournamentId,
        game_match: MatchId,
    },
}

/// Cloneable handle to the broadcast channel.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// `capacity` events are buffered per slow subscriber before it starts lagging.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: Event) {
        // Err only means nobody is listening.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Log every event until the bus is dropped. Stands in for the socket broadcaster.
pub async fn log_events(mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => log::debug!("event: {:?}", event),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                log::warn!("Event logger lagged, skipped {} event(s)", n)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
