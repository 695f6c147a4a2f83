//! Fixed-weight combination of the four models, followed by a consistency pass.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::features::FeatureSet;
use crate::grid::{ScoreGrid, MAX_ANALYTIC_GOALS};
use crate::mc::Rates;
use crate::model::{MainModel, MatchupModel, Model, ModelError, MomentumModel, Prediction, Probabilities, StatsModel};

/// Weights of the main, momentum, matchup and stats models.
pub const MODEL_WEIGHTS: [f64; 4] = [0.40, 0.25, 0.20, 0.15];

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Win-probability gap, in points, below which the two teams are considered level.
const LEVEL_EPSILON: f64 = 1e-9;

const CALIBRATION_ITERATIONS: usize = 48;

#[derive(Debug, Error, PartialEq)]
pub enum EnsembleError {
    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("model weights sum to {0}, not 1")]
    InvalidWeights(f64),

    #[error("the ensemble has no members")]
    NoMembers,

    #[error("non-finite combined prediction {0:?}")]
    NonFinite(Prediction),
}

pub struct Member {
    pub model: Box<dyn Model>,
    pub weight: f64,
}

pub struct Ensemble {
    members: Vec<Member>,
}
impl Ensemble {
    pub fn new(members: Vec<Member>) -> Result<Self, EnsembleError> {
        if members.is_empty() {
            return Err(EnsembleError::NoMembers);
        }
        let weight_sum = members.iter().map(|member| member.weight).sum::<f64>();
        if (weight_sum - 1.0).abs() > WEIGHT_TOLERANCE || members.iter().any(|member| member.weight < 0.0) {
            return Err(EnsembleError::InvalidWeights(weight_sum));
        }
        Ok(Self { members })
    }

    /// The main, momentum, matchup and stats models under [`MODEL_WEIGHTS`].
    pub fn standard() -> Self {
        let models: [Box<dyn Model>; 4] = [
            Box::new(MainModel),
            Box::new(MomentumModel),
            Box::new(MatchupModel),
            Box::new(StatsModel),
        ];
        Self {
            members: models
                .into_iter()
                .zip(MODEL_WEIGHTS)
                .map(|(model, weight)| Member { model, weight })
                .collect(),
        }
    }

    /// Runs every member and combines their outputs field by field in proportion to the member
    /// weights. Fails if any member fails or the combination is not finite.
    pub fn predict(&self, features: &FeatureSet) -> Result<EnsemblePrediction, EnsembleError> {
        let mut members = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let prediction = member.model.predict(features)?;
            debug!("{} model: {prediction:?}", member.model.name());
            members.push(MemberPrediction {
                model: member.model.name(),
                weight: member.weight,
                prediction,
            });
        }

        let weighted = |f: fn(&Prediction) -> f64| {
            members
                .iter()
                .map(|member| member.weight * f(&member.prediction))
                .sum::<f64>()
        };
        let combined = Prediction {
            probabilities: Probabilities::new(
                weighted(|prediction| prediction.probabilities.team1_win),
                weighted(|prediction| prediction.probabilities.draw),
                weighted(|prediction| prediction.probabilities.team2_win),
            ),
            projected_total: weighted(|prediction| prediction.projected_total),
            projected_margin: weighted(|prediction| prediction.projected_margin),
        };
        if !combined.is_finite() {
            return Err(EnsembleError::NonFinite(combined));
        }
        let combined = reconcile(combined);
        debug!("ensemble: {combined:?}");
        Ok(EnsemblePrediction { combined, members })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemberPrediction {
    pub model: &'static str,
    pub weight: f64,
    pub prediction: Prediction,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnsemblePrediction {
    pub combined: Prediction,
    pub members: Vec<MemberPrediction>,
}

/// Renormalises the probabilities to 100 and re-derives the margin from them: the combined
/// margin is replaced by the one at which independent Poisson goal counts about the projected total
/// reproduce the gap between the two win probabilities. The margin therefore takes the sign of that
/// gap, and level win probabilities give a zero margin.
pub fn reconcile(prediction: Prediction) -> Prediction {
    let probabilities = prediction.probabilities.normalised();
    let projected_total = prediction.projected_total.max(0.0);
    let lean = probabilities.team1_win - probabilities.team2_win;
    Prediction {
        probabilities,
        projected_total,
        projected_margin: calibrate_margin(lean, projected_total),
    }
}

/// Bisects for the margin within ±`projected_total` whose Poisson score grid puts team 1's win
/// probability `lean` percentage points above team 2's. A lean beyond reach saturates at the bound.
pub fn calibrate_margin(lean: f64, projected_total: f64) -> f64 {
    if lean.abs() < LEVEL_EPSILON || projected_total <= 0.0 {
        return 0.0;
    }
    let gap = |margin: f64| {
        let rates = Rates::from_projection(projected_total, margin);
        let outcomes = ScoreGrid::from_poisson(rates.team1, rates.team2, MAX_ANALYTIC_GOALS).outcome_probabilities();
        outcomes.team1_win - outcomes.team2_win
    };
    let (mut low, mut high) = (-projected_total, projected_total);
    for _ in 0..CALIBRATION_ITERATIONS {
        let mid = (low + high) / 2.0;
        if gap(mid) < lean {
            low = mid;
        } else {
            high = mid;
        }
    }
    (low + high) / 2.0
}
