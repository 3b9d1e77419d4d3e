//! Business logic: tournament lifecycle and brackets, scrims, and the cleanup sweep.

mod bracket;
mod lifecycle;
mod referee_code;
mod scrims;
mod sweep;
mod tournaments;

pub use bracket::{
    bracket_template, generate_bracket, next_power_of_two, round_robin_pairs, SlotDescriptor,
};
pub use lifecycle::{
    advance_status, allowed_targets, can_transition, check_readiness, Readiness, MIN_TEAMS,
};
pub use referee_code::{draw_code, generate_unique_code, CODE_LEN};
pub use scrims::{delete_scrim, post_scrim, request_scrim, ScrimError};
pub use sweep::{run_sweep, Retention, SweepError, SweepOptions, SweepReport};
pub use tournaments::{
    confirm_team, create_tournament, delete_tournament, get_tournament, join_as_referee,
    list_matches, record_result, register_team, seed_match, transition_status, MatchResult,
    NewTournament, Seeding,
};
