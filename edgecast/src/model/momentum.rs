//! The momentum model: recent form and streaks, blended with attack-versus-defence strength and
//! the venue.

use crate::features::FeatureSet;
use crate::model::{expected_goals, lerp, logistic_win_probability, Model, ModelError, Prediction, Probabilities, MAX_ADVANTAGE, MIN_DRAW};

const FORM_WEIGHT: f64 = 2.5;
const STREAK_WEIGHT: f64 = 0.05 * 3.0;
const MOMENTUM_INDEX_WEIGHT: f64 = 3.0;
const STRENGTH_WEIGHT: f64 = 0.8;
const LOCATION_WEIGHT: f64 = 1.2;

const MOMENTUM_SHARE: f64 = 0.5;
const STRENGTH_SHARE: f64 = 0.3;
const LOCATION_SHARE: f64 = 0.2;

const BASE_DRAW: f64 = 20.0;
const DRAW_PER_ADVANTAGE: f64 = 5.0;
const MAX_DRAW: f64 = 25.0;

const RECENT_GOALS_WEIGHT: f64 = 0.5;
const MARGIN_PER_ADVANTAGE: f64 = 0.5;

#[derive(Debug, Default)]
pub struct MomentumModel;
impl MomentumModel {
    pub const NAME: &'static str = "momentum";
}
impl Model for MomentumModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn predict(&self, features: &FeatureSet) -> Result<Prediction, ModelError> {
        let vip = features
            .vip
            .as_ref()
            .ok_or(ModelError::MissingVipStats { model: Self::NAME })?;
        let momentum = &vip.momentum;
        let (team1, team2) = (&features.advanced.team1, &features.advanced.team2);
        let location_factor = features.basic.location_factor;

        let momentum_advantage = momentum.form_advantage * FORM_WEIGHT
            + momentum.streak_advantage * STREAK_WEIGHT
            + (team1.momentum_index - team2.momentum_index) * MOMENTUM_INDEX_WEIGHT;
        let strength_advantage =
            (team1.attack - team2.defense) * STRENGTH_WEIGHT - (team2.attack - team1.defense) * STRENGTH_WEIGHT;
        let home_strength = if location_factor > 0.0 {
            team1.home_advantage
        } else {
            team2.home_advantage
        };
        let location_advantage = location_factor * home_strength * LOCATION_WEIGHT;
        let advantage = (MOMENTUM_SHARE * momentum_advantage
            + STRENGTH_SHARE * strength_advantage
            + LOCATION_SHARE * location_advantage)
            .clamp(-MAX_ADVANTAGE, MAX_ADVANTAGE);

        let draw = (BASE_DRAW - DRAW_PER_ADVANTAGE * advantage.abs()).clamp(MIN_DRAW, MAX_DRAW);
        let probabilities = Probabilities::new(
            logistic_win_probability(advantage),
            draw,
            logistic_win_probability(-advantage),
        )
        .normalised();

        let (expected1, expected2) = expected_goals(features);
        let mut projected_total = expected1 + expected2;
        if momentum.team1.matches > 0 && momentum.team2.matches > 0 {
            let recent_total = momentum.team1.recent_goals_per_game + momentum.team2.recent_goals_per_game;
            projected_total = lerp(projected_total, recent_total, RECENT_GOALS_WEIGHT);
        }
        let projected_margin = lerp(expected1 - expected2, advantage * MARGIN_PER_ADVANTAGE, 0.5);

        Ok(Prediction {
            probabilities,
            projected_total: projected_total.max(0.0),
            projected_margin,
        })
    }
}
