//! Elo-derived expected-score model.
//!
//! Every game is scored as a set of pairwise matchups. A player's expected
//! score is the sum of their win probabilities against each opponent, and the
//! realised score is fixed by finishing position ([`ACTUAL_SCORES`]). The gap
//! between the two is the score difference attributed to everything the
//! player touched that game.

/// Rating difference that corresponds to 10:1 odds on the logistic curve.
pub const ELO_SCALE: f64 = 400.0;

/// The scoring scheme below only has meaning for three-player games.
pub const PLAYERS_PER_GAME: usize = 3;

/// Points awarded for finishing 1st, 2nd and 3rd.
pub const ACTUAL_SCORES: [f64; PLAYERS_PER_GAME] = [2.0, 1.0, 0.0];

/// Expected pairwise wins per player slot, in the caller's (rank) order.
pub type ExpectedScores = [f64; PLAYERS_PER_GAME];

/// Probability that a player rated `elo_a` beats a player rated `elo_b`.
#[must_use]
pub fn win_probability(elo_a: i32, elo_b: i32) -> f64 {
    let diff = f64::from(elo_a) - f64::from(elo_b);
    1.0 / (1.0 + 10_f64.powf(-diff / ELO_SCALE))
}

/// Expected wins of each player against the other two.
///
/// The output order follows the input order; callers pass ratings already
/// sorted by finishing rank.
#[must_use]
pub fn expected_scores(elos: [i32; PLAYERS_PER_GAME]) -> ExpectedScores {
    let mut scores = [0.0; PLAYERS_PER_GAME];
    for (i, score) in scores.iter_mut().enumerate() {
        for (j, &opponent) in elos.iter().enumerate() {
            if i != j {
                *score += win_probability(elos[i], opponent);
            }
        }
    }
    scores
}

/// Actual minus expected score for each rank slot.
#[must_use]
pub fn score_differences(rank_sorted_elos: [i32; PLAYERS_PER_GAME]) -> ExpectedScores {
    let expected = expected_scores(rank_sorted_elos);
    std::array::from_fn(|slot| ACTUAL_SCORES[slot] - expected[slot])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn equal_ratings_are_a_coin_flip() {
        for elo in [0, 1200, 1500, 2400] {
            assert!((win_probability(elo, elo) - 0.5).abs() < TOLERANCE);
        }
    }

    #[test]
    fn win_probabilities_are_complementary() {
        for (a, b) in [(1500, 1400), (1200, 1900), (1650, 1651), (-50, 3000)] {
            let total = win_probability(a, b) + win_probability(b, a);
            assert!((total - 1.0).abs() < TOLERANCE, "{a} vs {b}: {total}");
        }
    }

    #[test]
    fn four_hundred_points_is_ten_to_one() {
        let p = win_probability(1900, 1500);
        assert!((p - 10.0 / 11.0).abs() < TOLERANCE);
    }

    #[test]
    fn equal_field_expects_one_win_each() {
        let scores = expected_scores([1500, 1500, 1500]);
        for score in scores {
            assert!((score - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn expected_scores_sum_to_two() {
        for elos in [[1500, 1500, 1500], [1800, 1400, 1100], [900, 2100, 1550]] {
            let total: f64 = expected_scores(elos).iter().sum();
            assert!((total - 2.0).abs() < TOLERANCE, "{elos:?}: {total}");
        }
    }

    #[test]
    fn expected_scores_keep_input_order() {
        let scores = expected_scores([1100, 1500, 1900]);
        assert!(scores[0] < scores[1]);
        assert!(scores[1] < scores[2]);
    }

    #[test]
    fn score_differences_subtract_expectation_from_rank_points() {
        let diffs = score_differences([1500, 1500, 1500]);
        assert!((diffs[0] - 1.0).abs() < TOLERANCE);
        assert!(diffs[1].abs() < TOLERANCE);
        assert!((diffs[2] + 1.0).abs() < TOLERANCE);
        let total: f64 = score_differences([1700, 1300, 1600]).iter().sum();
        assert!((total - 1.0).abs() < TOLERANCE);
    }
}
