//! Bracket templates and referee codes.

use challenger::logic::{bracket_template, draw_code, round_robin_pairs, CODE_LEN};
use challenger::{generate_bracket, next_power_of_two, BracketType, TournamentError};

#[test]
fn next_power_of_two_small_values() {
    assert_eq!(next_power_of_two(0), 1);
    assert_eq!(next_power_of_two(1), 1);
    assert_eq!(next_power_of_two(2), 2);
    assert_eq!(next_power_of_two(3), 4);
    assert_eq!(next_power_of_two(5), 8);
    assert_eq!(next_power_of_two(8), 8);
    assert_eq!(next_power_of_two(9), 16);
}

#[test]
fn next_power_of_two_is_smallest_power_at_least_n() {
    for n in 1..=1024usize {
        let p = next_power_of_two(n);
        assert!(p.is_power_of_two());
        assert!(p >= n);
        assert!(p == 1 || p / 2 < n, "{p} is not the smallest power >= {n}");
    }
}

#[test]
fn single_elim_eight_teams_has_seven_slots() {
    let slots = generate_bracket(8, "SINGLE_ELIM").unwrap();
    assert_eq!(slots.len(), 7);
    let indices: Vec<u32> = slots.iter().map(|s| s.slot).collect();
    assert_eq!(indices, (0..7).collect::<Vec<_>>());
    assert!(slots.iter().all(|s| s.team_a.is_none() && s.team_b.is_none()));
}

#[test]
fn single_elim_pads_to_next_power_of_two() {
    assert_eq!(generate_bracket(5, "SINGLE_ELIM").unwrap().len(), 7);
    assert_eq!(generate_bracket(2, "SINGLE_ELIM").unwrap().len(), 1);
    assert!(generate_bracket(1, "SINGLE_ELIM").unwrap().is_empty());
}

#[test]
fn double_elim_has_losers_bracket_as_large_as_winners() {
    let slots = bracket_template(6, BracketType::DoubleElim);
    // winners 0..7, losers 7..14
    assert_eq!(slots.len(), 14);
    assert_eq!(slots.first().unwrap().slot, 0);
    assert_eq!(slots.last().unwrap().slot, 13);
}

#[test]
fn round_robin_has_one_slot_per_pair() {
    assert_eq!(generate_bracket(4, "ROUND_ROBIN").unwrap().len(), 6);
    assert_eq!(generate_bracket(5, "ROUND_ROBIN").unwrap().len(), 10);
    assert!(generate_bracket(1, "ROUND_ROBIN").unwrap().is_empty());
}

#[test]
fn round_robin_pairs_are_lexicographic() {
    let pairs: Vec<_> = round_robin_pairs(4).collect();
    assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
}

#[test]
fn unknown_bracket_type_is_rejected() {
    match generate_bracket(3, "UNKNOWN_TYPE") {
        Err(TournamentError::UnsupportedBracketType(kind)) => assert_eq!(kind, "UNKNOWN_TYPE"),
        other => panic!("expected UnsupportedBracketType, got {other:?}"),
    }
}

#[test]
fn referee_code_is_six_uppercase_alphanumerics() {
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let code = draw_code(&mut rng);
        assert_eq!(code.len(), CODE_LEN);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
