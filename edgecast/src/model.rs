//! Scoring models. Each model maps a [`FeatureSet`] to win/draw/loss probabilities together with a
//! projected total and a projected margin.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Score, Side};
use crate::features::{FeatureSet, TeamStats};
use crate::probs::SliceExt;

pub mod ensemble;
pub mod main;
pub mod matchup;
pub mod momentum;
pub mod stats;

pub use ensemble::{Ensemble, EnsembleError, EnsemblePrediction, MemberPrediction};
pub use main::{Feature, MainModel};
pub use matchup::MatchupModel;
pub use momentum::MomentumModel;
pub use stats::StatsModel;

/// Steepness of the logistic curve mapping an advantage score to a win probability.
pub const LOGISTIC_STEEPNESS: f64 = 1.2;

/// Bound on the advantage scores of the secondary models.
pub const MAX_ADVANTAGE: f64 = 3.0;

/// Goals per match assumed for a team without recorded matches.
pub const DEFAULT_TEAM_GOALS: f64 = 1.3;

pub const MIN_DRAW: f64 = 5.0;

/// Win/draw/loss probabilities of the upcoming match, in percent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub team1_win: f64,
    pub draw: f64,
    pub team2_win: f64,
}
impl Probabilities {
    pub fn new(team1_win: f64, draw: f64, team2_win: f64) -> Self {
        Self {
            team1_win,
            draw,
            team2_win,
        }
    }

    pub fn even() -> Self {
        Self::new(100.0 / 3.0, 100.0 / 3.0, 100.0 / 3.0)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.team1_win, self.draw, self.team2_win]
    }

    pub fn sum(&self) -> f64 {
        self.to_array().sum()
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|prob| prob.is_finite())
    }

    /// Probability of `winner` prevailing, where `None` stands for a draw.
    pub fn of(&self, winner: Option<Side>) -> f64 {
        match winner {
            Some(Side::Team1) => self.team1_win,
            None => self.draw,
            Some(Side::Team2) => self.team2_win,
        }
    }

    /// Rescales the probabilities to sum to 100. Negative entries are floored at zero; a book with
    /// a non-finite entry or nothing left to scale becomes even.
    pub fn normalised(&self) -> Self {
        if !self.is_finite() {
            return Self::even();
        }
        let mut probs = self.to_array().map(|prob| prob.max(0.0));
        let sum = probs.normalise(100.0);
        if sum > 0.0 && sum.is_finite() {
            Self::new(probs[0], probs[1], probs[2])
        } else {
            Self::even()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probabilities: Probabilities,
    pub projected_total: f64,
    /// Expected team 1 goals less team 2 goals.
    pub projected_margin: f64,
}
impl Prediction {
    /// The projected total split about the projected margin, rounded to whole goals.
    pub fn projected_score(&self) -> Score {
        let goals = |expectation: f64| expectation.round().clamp(0.0, u8::MAX as f64) as u8;
        Score::new(
            goals((self.projected_total + self.projected_margin) / 2.0),
            goals((self.projected_total - self.projected_margin) / 2.0),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.probabilities.is_finite() && self.projected_total.is_finite() && self.projected_margin.is_finite()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("the {model} model requires enhanced statistics")]
    MissingVipStats { model: &'static str },
}

pub trait Model: Send + Sync {
    fn name(&self) -> &'static str;

    fn predict(&self, features: &FeatureSet) -> Result<Prediction, ModelError>;
}

/// Maps an advantage score to team 1's win probability, in percent.
pub fn logistic_win_probability(advantage: f64) -> f64 {
    50.0 + 50.0 * (2.0 / (1.0 + f64::exp(-LOGISTIC_STEEPNESS * advantage)) - 1.0)
}

/// Makes room for `draw` by scaling the win probabilities by the share left over, then normalises.
pub fn compose(team1_win: f64, team2_win: f64, draw: f64) -> Probabilities {
    let remainder = 1.0 - draw / 100.0;
    Probabilities::new(team1_win * remainder, draw, team2_win * remainder).normalised()
}

/// Expected goals of each team: the average of its own scoring rate and the other team's conceding
/// rate.
pub fn expected_goals(features: &FeatureSet) -> (f64, f64) {
    fn rate(stats: &TeamStats, f: fn(&TeamStats) -> f64) -> f64 {
        if stats.matches == 0 {
            DEFAULT_TEAM_GOALS
        } else {
            f(stats)
        }
    }
    let (team1, team2) = (&features.basic.team1, &features.basic.team2);
    let scored = |stats: &TeamStats| stats.avg_scored;
    let conceded = |stats: &TeamStats| stats.avg_conceded;
    (
        (rate(team1, scored) + rate(team2, conceded)) / 2.0,
        (rate(team2, scored) + rate(team1, conceded)) / 2.0,
    )
}

fn lerp(from: f64, to: f64, weight: f64) -> f64 {
    from + (to - from) * weight
}
