use crate::model::constants::LOGISTIC_SCALE;

/// Result of a game from the home (first-named) competitor's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Draw
}

impl Outcome {
    /// Scored outcome `S` for the home side: 1 for a win, 0.5 for a draw, 0 for a loss.
    pub fn home_score(self) -> f64 {
        match self {
            Outcome::HomeWin => 1.0,
            Outcome::AwayWin => 0.0,
            Outcome::Draw => 0.5
        }
    }
}

/// `P(A) = 1 / (1 + 10^((rating_b - rating_a) / 400))`
pub fn win_probability(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / LOGISTIC_SCALE))
}

/// The amount added to A and subtracted from B. `score` is A's outcome in {0, 0.5, 1}.
pub fn exchange(rating_a: f64, rating_b: f64, score: f64, k: f64) -> f64 {
    k * (score - win_probability(rating_a, rating_b))
}
