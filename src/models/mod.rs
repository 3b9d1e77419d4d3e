//! Documents kept in the store. Cross-document references are plain ids.

mod game;
mod notification;
mod scrim;
mod team;
mod tournament;
mod user;

pub use game::{GameMatch, MatchId, MatchStatus};
pub use notification::{Notification, NotificationId};
pub use scrim::{Chat, ChatId, ChatMessage, Scrim, ScrimId, ScrimStatus};
pub use team::{Team, TeamId};
pub use tournament::{
    BracketType, Phase, PhaseStatus, Tournament, TournamentError, TournamentId, TournamentStatus,
};
pub use user::{User, UserId, UserRole};
