//! Bracket templates: the empty match slots of a phase, before teams are seeded.

use crate::models::{BracketType, TeamId, TournamentError};
use serde::{Deserialize, Serialize};

/// One empty match slot. Teams are always `None` in a fresh template.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SlotDescriptor {
    pub slot: u32,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
}

impl SlotDescriptor {
    fn empty(slot: u32) -> Self {
        Self {
            slot,
            team_a: None,
            team_b: None,
        }
    }
}

/// Smallest power of two >= `n`. Returns 1 for `n <= 1`.
pub fn next_power_of_two(n: usize) -> usize {
    if n <= 1 {
        1
    } else {
        n.next_power_of_two()
    }
}

/// Parse `bracket_type` and lay out its template for `team_count` teams.
pub fn generate_bracket(
    team_count: usize,
    bracket_type: &str,
) -> Result<Vec<SlotDescriptor>, TournamentError> {
    let kind: BracketType = bracket_type.parse()?;
    Ok(bracket_template(team_count, kind))
}

/// Template for an already-typed bracket.
///
/// - Single elimination: `slots - 1` matches, where `slots` pads `team_count` to a power of two.
/// - Double elimination: the winners bracket as above, then a losers bracket of the same size.
/// - Round robin: one match per unordered pair of teams, pairs `(i, j)` with `i < j` in order.
pub fn bracket_template(team_count: usize, bracket_type: BracketType) -> Vec<SlotDescriptor> {
    let count = match bracket_type {
        BracketType::SingleElim => next_power_of_two(team_count) - 1,
        BracketType::DoubleElim => {
            let winners = next_power_of_two(team_count) - 1;
            let losers = winners;
            winners + losers
        }
        BracketType::RoundRobin => round_robin_pairs(team_count).count(),
    };
    (0..count as u32).map(SlotDescriptor::empty).collect()
}

/// Pairs of team indices in the order their round-robin slots are numbered.
pub fn round_robin_pairs(team_count: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..team_count).flat_map(move |i| (i + 1..team_count).map(move |j| (i, j)))
}
