//! Challenger backend: teams, scrims and tournaments over a schema-less document store,
//! with a daily sweep that repairs dangling references.

pub mod api;
pub mod config;
pub mod events;
pub mod logic;
pub mod models;
pub mod scheduler;
pub mod store;

pub use config::{Config, ConfigError};
pub use events::{Event, EventBus};
pub use logic::{
    can_transition, check_readiness, generate_bracket, next_power_of_two, run_sweep, Readiness,
    Retention, SlotDescriptor, SweepError, SweepOptions, SweepReport,
};
pub use models::{
    BracketType, Chat, GameMatch, MatchId, MatchStatus, Notification, Phase, PhaseStatus, Scrim,
    ScrimId, Team, TeamId, Tournament, TournamentError, TournamentId, TournamentStatus, User,
    UserId,
};
pub use store::{Store, StoreError};
